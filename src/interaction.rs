// =============================================================================
// 操作ステートマシン（マウス操作 → 移動）
// =============================================================================
// ホストから届く入力イベント（押下・移動・離す・キー）を受け取り、
// どのカードが対象か、クリック・ドラッグ・ダブルクリックのどれかを判別して
// ゲームセッションの移動操作を呼び出します。
//
// 状態：
// - Idle: 何もつかんでいない
// - Dragging: カードの束をつかんでいる（盤面からは取り除かない）
//
// ドラッグ中もカードは元のパイルに残ったままで、動くのは表示位置だけです。
// ドロップが不成立なら盤面は何も変わりません。
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::clock::Clock;
use crate::config::GameConfig;
use crate::game::Klondike;
use crate::piles::{PileId, FOUNDATION_COUNT, TABLEAU_COUNT};
use crate::snapshot::GameSnapshot;

/// ドラッグ中の束
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drag {
    /// 先頭（一番下）から順に並んだカード
    pub stack: Vec<CardId>,
    /// 移動元のパイル
    pub source: PileId,
    /// 押下位置とカード左上とのずれ
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Drag {
    /// 移動の合法性を決める先頭のカード
    pub fn lead(&self) -> Option<CardId> {
        self.stack.first().copied()
    }
}

/// 操作状態
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

/// 押下イベントの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// 何も起きなかった
    Ignored,
    /// ダブルクリックでファウンデーションへ自動移動した
    AutoMoved { card: CardId, foundation: usize },
    /// ストックから1枚引いた
    Drew,
    /// ウェイストをストックに戻した
    Recycled,
    /// ドラッグを開始した
    DragStarted { card: CardId, source: PileId },
}

/// 離すイベントの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// ドラッグしていなかった
    NotDragging,
    /// 合法な移動先がなく、元に戻った
    Abandoned,
    ToFoundation(usize),
    ToTableau(usize),
}

/// 直前のクリック（ダブルクリック判定用）
#[derive(Debug, Clone, Copy, Default)]
struct LastClick {
    card: Option<CardId>,
    at_ms: u64,
}

/// 1人用のゲーム卓
///
/// ゲームセッション・操作状態・時計を所有し、入力イベントを1つずつ処理します。
pub struct Table<C: Clock> {
    game: Klondike,
    config: GameConfig,
    clock: C,
    drag: DragState,
    last_click: LastClick,
    pointer: (f32, f32),
}

impl<C: Clock> Table<C> {
    /// 新しい卓を用意してゲームを開始
    pub fn new(config: GameConfig, clock: C) -> Self {
        let game = Klondike::new(config.layout.clone());
        Self::from_game(game, config, clock)
    }

    /// 固定シードで卓を用意する
    pub fn with_seed(seed: u64, config: GameConfig, clock: C) -> Self {
        let game = Klondike::with_seed(seed, config.layout.clone());
        Self::from_game(game, config, clock)
    }

    /// 既存のゲームセッションから卓を用意する
    ///
    /// 当たり判定と表示位置が食い違わないよう、設定のレイアウトをゲームに入れ直します。
    pub fn from_game(mut game: Klondike, config: GameConfig, clock: C) -> Self {
        if game.layout() != &config.layout {
            game.set_layout(config.layout.clone());
        }
        Self {
            game,
            config,
            clock,
            drag: DragState::Idle,
            last_click: LastClick::default(),
            pointer: (0.0, 0.0),
        }
    }

    pub fn game(&self) -> &Klondike {
        &self.game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// 描画用のスナップショット
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.game, &self.drag, self.pointer)
    }

    // -------------------------------------------------------------------------
    // 当たり判定
    // -------------------------------------------------------------------------

    /// 座標にある操作可能なカードとその所属パイルを探す
    ///
    /// 優先順：ウェイストの一番上 → ファウンデーション0〜3の一番上 →
    /// タブロー0〜6の表向きカード（列内では上に重なっているものを優先）
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(CardId, PileId)> {
        let piles = self.game.piles();
        let layout = self.game.layout();
        let contains = |id: CardId| {
            let card = piles.card(id);
            layout.card_rect(card.x, card.y).contains(x, y)
        };

        if let Some(id) = piles.top(PileId::Waste).filter(|id| contains(*id)) {
            return Some((id, PileId::Waste));
        }

        for f in 0..FOUNDATION_COUNT as u8 {
            let pile = PileId::Foundation(f);
            if let Some(id) = piles.top(pile).filter(|id| contains(*id)) {
                return Some((id, pile));
            }
        }

        for t in 0..TABLEAU_COUNT as u8 {
            let pile = PileId::Tableau(t);
            let hit = piles
                .pile(pile)
                .iter()
                .rev()
                .find(|id| piles.card(**id).face_up && contains(**id));
            if let Some(id) = hit {
                return Some((*id, pile));
            }
        }

        None
    }

    // -------------------------------------------------------------------------
    // 入力イベント
    // -------------------------------------------------------------------------

    /// マウス押下
    pub fn pointer_press(&mut self, x: f32, y: f32) -> PressOutcome {
        self.pointer = (x, y);
        if self.drag != DragState::Idle {
            log::debug!("⚠️ 前回のドラッグを破棄します");
            self.drag = DragState::Idle;
        }

        let now = self.clock.now_ms();
        let hit = self.hit_test(x, y);

        // ダブルクリック：ファウンデーションへの自動移動を試す
        if let Some((card, _)) = hit {
            let elapsed = now.saturating_sub(self.last_click.at_ms);
            if self.last_click.card == Some(card) && elapsed < self.config.double_click_ms {
                if let Some(foundation) = self.auto_move_to_foundation(card) {
                    self.last_click = LastClick::default();
                    return PressOutcome::AutoMoved { card, foundation };
                }
            }
        }

        self.last_click = LastClick {
            card: hit.map(|(card, _)| card),
            at_ms: now,
        };

        let Some((card, source)) = hit else {
            if self.game.layout().stock_rect().contains(x, y) {
                return self.click_stock();
            }
            return PressOutcome::Ignored;
        };

        self.start_drag(card, source, x, y);
        PressOutcome::DragStarted { card, source }
    }

    /// ポインタ移動（ドラッグ中の束の描画位置に使う）
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
    }

    /// マウスを離す
    pub fn pointer_release(&mut self, x: f32, y: f32) -> DropOutcome {
        self.pointer = (x, y);
        let DragState::Dragging(drag) = std::mem::take(&mut self.drag) else {
            return DropOutcome::NotDragging;
        };
        let Some(lead) = drag.lead() else {
            return DropOutcome::Abandoned;
        };
        if self.game.piles().slot(lead).pile != drag.source {
            return DropOutcome::Abandoned;
        }

        let (foundation, tableau) = {
            let layout = self.game.layout();
            // 組札には1枚だけ置ける
            let foundation = (drag.stack.len() == 1)
                .then(|| {
                    (0..FOUNDATION_COUNT).find(|f| {
                        layout.foundation_rect(*f).contains(x, y) && self.game.can_move_to_foundation(lead, *f)
                    })
                })
                .flatten();
            let tableau = (0..TABLEAU_COUNT)
                .find(|t| layout.tableau_slot(*t).contains(x, y) && self.game.can_move_to_tableau(lead, *t));
            (foundation, tableau)
        };

        if let Some(f) = foundation {
            if self.game.move_to_foundation(lead, f) {
                return DropOutcome::ToFoundation(f);
            }
        }
        if let Some(t) = tableau {
            if self.game.move_to_tableau(lead, t) {
                return DropOutcome::ToTableau(t);
            }
        }

        log::debug!("↩️ 移動先がないためドラッグを取り消しました");
        DropOutcome::Abandoned
    }

    /// 新しいゲームを要求（ドラッグ中でもよい）
    pub fn request_new_game(&mut self) {
        self.drag = DragState::Idle;
        self.last_click = LastClick::default();
        self.game.start_new_game();
    }

    /// キー入力。`n` / `N` で新しいゲーム。処理した場合 true
    pub fn key_command(&mut self, key: char) -> bool {
        match key {
            'n' | 'N' => {
                self.request_new_game();
                true
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // 内部処理
    // -------------------------------------------------------------------------

    /// ファウンデーション0〜3の順に置ける場所を探して移動する
    fn auto_move_to_foundation(&mut self, card: CardId) -> Option<usize> {
        if !self.game.piles().is_top(card) {
            return None;
        }
        let foundation = (0..FOUNDATION_COUNT).find(|f| self.game.can_move_to_foundation(card, *f))?;
        if !self.game.move_to_foundation(card, foundation) {
            return None;
        }
        log::debug!("✨ ダブルクリックでファウンデーション{}に自動配置", foundation + 1);
        Some(foundation)
    }

    /// ストック枠のクリック：引くか、空ならウェイストを戻す
    fn click_stock(&mut self) -> PressOutcome {
        if self.game.draw_from_stock() {
            PressOutcome::Drew
        } else if self.game.recycle_waste() {
            PressOutcome::Recycled
        } else {
            PressOutcome::Ignored
        }
    }

    fn start_drag(&mut self, card: CardId, source: PileId, x: f32, y: f32) {
        let piles = self.game.piles();
        let stack = if source.is_tableau() {
            piles.stack_from(card).to_vec()
        } else {
            vec![card]
        };
        let view = piles.card(card);
        self.drag = DragState::Dragging(Drag {
            stack,
            source,
            offset_x: x - view.x,
            offset_y: y - view.y,
        });
    }
}
