// =============================================================================
// ゲームセッションと移動の実行
// =============================================================================
// 1ゲーム分の盤面（パイルストア）、勝敗フラグ、乱数源をまとめて保持し、
// 検証済みの移動を盤面に反映します。
//
// 主要な責務：
// - 新しいゲームの開始（デッキ生成・シャッフル・配布）
// - ストックからウェイストへのドロー、ウェイストのリサイクル
// - ファウンデーション・タブローへの移動と、露出したカードの表返し
// - 勝利条件の判定
//
// 移動の合法性はここでは再検証しません（操作層がドロップ時に判定します）。
// ただし「一番上から取り出す」前提が崩れる呼び出しは盤面を壊さずに拒否します。
// =============================================================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::card::{CardId, DECK_SIZE};
use crate::deck::{build_shuffled_deck, deal};
use crate::layout::Layout;
use crate::piles::{PileId, Piles};
use crate::rules;

/// ゲームの結果
///
/// 負けの自動判定はありません（詰みかどうかはプレイヤーが判断します）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    #[default]
    None,
    Win,
}

/// 進行状況のカウンタ（表示用。スコア計算には使わない）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GameStats {
    /// ファウンデーション・タブローへの移動回数
    pub move_count: u32,
    /// ストックから引いた回数
    pub draw_count: u32,
    /// ウェイストをストックに戻した回数
    pub recycle_count: u32,
}

/// クロンダイクのゲームセッション
pub struct Klondike {
    piles: Piles,
    result: GameResult,
    stats: GameStats,
    rng: StdRng,
    layout: Layout,
}

impl Klondike {
    /// OS の乱数源でシードしたゲームを開始
    pub fn new(layout: Layout) -> Self {
        Self::from_rng(StdRng::from_entropy(), layout)
    }

    /// 固定シードでゲームを開始（再現可能な配り方）
    pub fn with_seed(seed: u64, layout: Layout) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), layout)
    }

    fn from_rng(mut rng: StdRng, layout: Layout) -> Self {
        let piles = Self::fresh_piles(&mut rng, &layout);
        let game = Self {
            piles,
            result: GameResult::None,
            stats: GameStats::default(),
            rng,
            layout,
        };
        game.log_new_game();
        game
    }

    /// 既存の盤面からセッションを作る（テストや盤面の復元用）
    pub fn from_piles(piles: Piles, layout: Layout, seed: u64) -> Self {
        let mut game = Self {
            piles,
            result: GameResult::None,
            stats: GameStats::default(),
            rng: StdRng::seed_from_u64(seed),
            layout,
        };
        game.piles.relayout(&game.layout);
        game.check_win_condition();
        game
    }

    fn fresh_piles(rng: &mut StdRng, layout: &Layout) -> Piles {
        let deck = build_shuffled_deck(rng);
        let mut piles = deal(deck).expect("生成直後のデッキは必ず配布できます。これはバグです。");
        piles.relayout(layout);
        piles
    }

    fn log_new_game(&self) {
        log::info!(
            "🎮 新しいクロンダイクを開始します（ストック{}枚）",
            self.piles.pile(PileId::Stock).len()
        );
    }

    // -------------------------------------------------------------------------
    // 参照
    // -------------------------------------------------------------------------

    pub fn piles(&self) -> &Piles {
        &self.piles
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_won(&self) -> bool {
        self.result == GameResult::Win
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// レイアウトを差し替えて全カードの表示位置を計算し直す
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.piles.relayout(&self.layout);
    }

    /// `card` を組札 `foundation_index` に置けるか
    pub fn can_move_to_foundation(&self, card: CardId, foundation_index: usize) -> bool {
        rules::can_move_to_foundation(&self.piles, self.piles.card(card), foundation_index)
    }

    /// `card` を先頭とする束を場札 `tableau_index` に置けるか
    pub fn can_move_to_tableau(&self, card: CardId, tableau_index: usize) -> bool {
        rules::can_move_to_tableau(&self.piles, self.piles.card(card), tableau_index)
    }

    // -------------------------------------------------------------------------
    // ゲームの開始
    // -------------------------------------------------------------------------

    /// 勝敗フラグを消し、新しいデッキを配り直す
    pub fn start_new_game(&mut self) {
        self.result = GameResult::None;
        self.stats = GameStats::default();
        self.piles = Self::fresh_piles(&mut self.rng, &self.layout);
        self.log_new_game();
    }

    // -------------------------------------------------------------------------
    // 移動の実行
    // -------------------------------------------------------------------------

    /// 1枚をファウンデーションに移動する
    ///
    /// 移動元はカードの現在位置から決まり、一番上のカードである必要があります。
    /// タブローから取った場合、露出したカードが裏向きなら表にします。
    /// 盤面が変わった場合 true。
    pub fn move_to_foundation(&mut self, card: CardId, foundation_index: usize) -> bool {
        let Ok(target) = PileId::foundation(foundation_index) else {
            return false;
        };
        let source = self.piles.slot(card).pile;
        if source == target || source == PileId::Stock || !self.piles.is_top(card) {
            return false;
        }

        self.piles.pop(source);
        self.piles.reveal_top(source);
        self.piles.push(target, card);
        self.finish_move(card, source, target);
        self.check_win_condition();
        true
    }

    /// カード（タブローからならその上の束ごと）をタブローに移動する
    ///
    /// タブローからの移動では `card` から一番上までを順序を保って移し、
    /// 移動元に露出したカードが裏向きなら表にします。
    /// ウェイスト・ファウンデーションからは一番上の1枚だけを移します。
    pub fn move_to_tableau(&mut self, card: CardId, tableau_index: usize) -> bool {
        let Ok(target) = PileId::tableau(tableau_index) else {
            return false;
        };
        let slot = self.piles.slot(card);
        let source = slot.pile;
        if source == target {
            return false;
        }

        match source {
            PileId::Tableau(_) => {
                let stack = self.piles.split_off(source, slot.index);
                for id in stack {
                    self.piles.push(target, id);
                }
                self.piles.reveal_top(source);
            }
            PileId::Waste | PileId::Foundation(_) => {
                if !self.piles.is_top(card) {
                    return false;
                }
                self.piles.pop(source);
                self.piles.push(target, card);
            }
            PileId::Stock => return false,
        }

        self.finish_move(card, source, target);
        true
    }

    fn finish_move(&mut self, card: CardId, source: PileId, target: PileId) {
        self.stats.move_count += 1;
        self.piles.relayout(&self.layout);
        log::debug!(
            "🎯 {} を {} から {} へ移動",
            self.piles.card(card),
            source.name(),
            target.name()
        );
    }

    /// 勝利条件のチェック：ファウンデーションの合計が52枚なら勝ち
    pub fn check_win_condition(&mut self) -> bool {
        if self.piles.foundation_count() == DECK_SIZE && self.result != GameResult::Win {
            self.result = GameResult::Win;
            log::info!("🎉 ゲーム完了！勝利！（{}手）", self.stats.move_count);
        }
        self.is_won()
    }

    /// ストックの一番上を表にしてウェイストに置く
    ///
    /// ストックが空なら何もせず false（`recycle_waste` を使う）。
    pub fn draw_from_stock(&mut self) -> bool {
        let Some(id) = self.piles.pop(PileId::Stock) else {
            return false;
        };
        self.piles.card_mut(id).flip_up();
        self.piles.push(PileId::Waste, id);
        self.stats.draw_count += 1;
        self.piles.relayout(&self.layout);
        log::debug!("🎴 ストックから引きました: {}", self.piles.card(id));
        true
    }

    /// ウェイストを全て裏向きにしてストックへ戻す
    ///
    /// 1枚ずつ上から戻すので順序が反転し、次に引く順番は最初と同じになります。
    /// ウェイストが空なら何もせず false。
    pub fn recycle_waste(&mut self) -> bool {
        if self.piles.pile(PileId::Waste).is_empty() {
            return false;
        }
        let count = self.piles.pile(PileId::Waste).len();
        while let Some(id) = self.piles.pop(PileId::Waste) {
            self.piles.card_mut(id).flip_down();
            self.piles.push(PileId::Stock, id);
        }
        self.stats.recycle_count += 1;
        self.piles.relayout(&self.layout);
        log::debug!("♻️ ウェイストをストックに戻しました（{}枚）", count);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use crate::piles::{FOUNDATION_COUNT, TABLEAU_COUNT};
    use rand::Rng;

    fn id(suit: Suit, rank: Rank) -> CardId {
        CardId::of(suit, rank)
    }

    /// タブローとファウンデーションを指定し、残りをストックに置いた盤面を作る
    ///
    /// タブローの各要素は (スート, ランク, 表向きか)。
    fn board(
        tableau: &[(usize, Vec<(Suit, Rank, bool)>)],
        foundations: &[(usize, Vec<(Suit, Rank)>)],
    ) -> Klondike {
        let mut cards: Vec<Card> = Vec::new();
        for suit in Suit::all() {
            for rank in Rank::all() {
                cards.push(Card::new(suit, rank));
            }
        }
        let mut t: [Vec<CardId>; TABLEAU_COUNT] = Default::default();
        let mut f: [Vec<CardId>; FOUNDATION_COUNT] = Default::default();
        for (i, pile) in tableau {
            for (suit, rank, up) in pile.iter() {
                let cid = id(*suit, *rank);
                cards[cid.index()].face_up = *up;
                t[*i].push(cid);
            }
        }
        for (i, pile) in foundations {
            for (suit, rank) in pile.iter() {
                let cid = id(*suit, *rank);
                cards[cid.index()].face_up = true;
                f[*i].push(cid);
            }
        }
        let placed: Vec<CardId> = t.iter().chain(f.iter()).flatten().copied().collect();
        let stock: Vec<CardId> = cards.iter().map(Card::id).filter(|c| !placed.contains(c)).collect();
        let piles = Piles::from_parts(cards, stock, vec![], f, t).unwrap();
        Klondike::from_piles(piles, Layout::default(), 0)
    }

    #[test]
    fn test_new_game_is_valid() {
        let game = Klondike::with_seed(3, Layout::default());
        game.piles().check_invariants().unwrap();
        assert_eq!(game.result(), GameResult::None);
        assert_eq!(game.piles().pile(PileId::Stock).len(), 24);
    }

    #[test]
    fn test_move_stack_onto_matching_tableau() {
        // 列0: [K♠(裏), Q♥, J♠, 10♥]、列1: [K♣]、列2: 空
        let mut game = board(
            &[
                (0, vec![
                    (Suit::Spade, Rank::King, false),
                    (Suit::Heart, Rank::Queen, true),
                    (Suit::Spade, Rank::Jack, true),
                    (Suit::Heart, Rank::Ten, true),
                ]),
                (1, vec![(Suit::Club, Rank::King, true)]),
            ],
            &[],
        );
        let queen = id(Suit::Heart, Rank::Queen);

        // 空の列には K しか置けない
        assert!(!game.can_move_to_tableau(queen, 2), "Q♥ を先頭とする束は空の列に置けないはず");
        // K♣ の上なら Q♥ から3枚まとめて置ける
        assert!(game.can_move_to_tableau(queen, 1));
        assert!(game.move_to_tableau(queen, 1));

        assert_eq!(
            game.piles().pile(PileId::Tableau(1)),
            &[id(Suit::Club, Rank::King), queen, id(Suit::Spade, Rank::Jack), id(Suit::Heart, Rank::Ten)]
        );
        assert_eq!(game.piles().pile(PileId::Tableau(0)), &[id(Suit::Spade, Rank::King)]);
        assert!(game.piles().card(id(Suit::Spade, Rank::King)).face_up, "露出したカードは表になるはず");
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_move_partial_suffix() {
        // 列0: [Q♥, J♠, 10♥]、列1: [Q♦] → J♠ から2枚を移す
        let mut game = board(
            &[
                (0, vec![
                    (Suit::Heart, Rank::Queen, true),
                    (Suit::Spade, Rank::Jack, true),
                    (Suit::Heart, Rank::Ten, true),
                ]),
                (1, vec![(Suit::Diamond, Rank::Queen, true)]),
            ],
            &[],
        );
        let jack = id(Suit::Spade, Rank::Jack);
        assert!(game.can_move_to_tableau(jack, 1));
        assert!(game.move_to_tableau(jack, 1));
        assert_eq!(game.piles().pile(PileId::Tableau(0)), &[id(Suit::Heart, Rank::Queen)]);
        assert_eq!(
            game.piles().pile(PileId::Tableau(1)),
            &[id(Suit::Diamond, Rank::Queen), jack, id(Suit::Heart, Rank::Ten)]
        );
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_move_to_foundation_reveals_card() {
        let mut game = board(
            &[(3, vec![(Suit::Club, Rank::Nine, false), (Suit::Spade, Rank::Ace, true)])],
            &[],
        );
        let ace = id(Suit::Spade, Rank::Ace);
        assert!(game.can_move_to_foundation(ace, 0));
        assert!(game.move_to_foundation(ace, 0));
        assert_eq!(game.piles().pile(PileId::Foundation(0)), &[ace]);
        assert!(game.piles().card(id(Suit::Club, Rank::Nine)).face_up);
        assert_eq!(game.stats().move_count, 1);
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_move_to_foundation_rejects_buried_card() {
        let mut game = board(
            &[(0, vec![
                (Suit::Spade, Rank::Six, true),
                (Suit::Heart, Rank::Five, true),
                (Suit::Spade, Rank::Four, true),
            ])],
            &[(0, vec![
                (Suit::Heart, Rank::Ace),
                (Suit::Heart, Rank::Two),
                (Suit::Heart, Rank::Three),
                (Suit::Heart, Rank::Four),
            ])],
        );
        let five = id(Suit::Heart, Rank::Five);
        assert!(!game.move_to_foundation(five, 0), "一番上でないカードは移動できないはず");
        assert_eq!(game.piles().pile(PileId::Foundation(0)).len(), 4);
        assert_eq!(game.piles().slot(five).pile, PileId::Tableau(0));
        assert_eq!(game.stats().move_count, 0);
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_set_layout_moves_cards() {
        let mut game = Klondike::with_seed(9, Layout::default());
        let mut layout = Layout::default();
        layout.margin = 40.0;
        game.set_layout(layout.clone());
        let top = game.piles().top(PileId::Stock).unwrap();
        let card = game.piles().card(top);
        assert_eq!((card.x, card.y), (layout.stock_rect().x, layout.stock_rect().y));
    }

    #[test]
    fn test_foundation_to_foundation_keeps_conservation() {
        let mut game = board(&[], &[(2, vec![(Suit::Heart, Rank::Ace)])]);
        let ace = id(Suit::Heart, Rank::Ace);
        assert!(game.move_to_foundation(ace, 0));
        assert!(game.piles().pile(PileId::Foundation(2)).is_empty(), "移動元の組札から取り除かれるはず");
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_foundation_card_back_to_tableau() {
        let mut game = board(
            &[(0, vec![(Suit::Spade, Rank::Three, true)])],
            &[(0, vec![(Suit::Heart, Rank::Ace), (Suit::Heart, Rank::Two)])],
        );
        let two = id(Suit::Heart, Rank::Two);
        assert!(game.can_move_to_tableau(two, 0));
        assert!(game.move_to_tableau(two, 0));
        assert_eq!(game.piles().pile(PileId::Foundation(0)), &[id(Suit::Heart, Rank::Ace)]);
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_draw_all_then_recycle_restores_order() {
        let mut game = Klondike::with_seed(11, Layout::default());
        let stock_size = game.piles().pile(PileId::Stock).len();

        let mut first_pass = Vec::new();
        while game.draw_from_stock() {
            first_pass.push(game.piles().top(PileId::Waste).unwrap());
        }
        assert_eq!(first_pass.len(), stock_size);
        assert!(game.piles().pile(PileId::Stock).is_empty());
        assert!(!game.draw_from_stock(), "空のストックからは引けないはず");
        let waste_before: Vec<CardId> = game.piles().pile(PileId::Waste).to_vec();

        assert!(game.recycle_waste());
        assert!(game.piles().pile(PileId::Waste).is_empty());
        assert_eq!(game.piles().pile(PileId::Stock).len(), stock_size);
        assert!(game.piles().pile(PileId::Stock).iter().all(|c| !game.piles().card(*c).face_up));
        let reversed: Vec<CardId> = waste_before.iter().rev().copied().collect();
        assert_eq!(game.piles().pile(PileId::Stock), reversed.as_slice(), "ストックはウェイストの逆順のはず");
        game.piles().check_invariants().unwrap();

        let mut second_pass = Vec::new();
        while game.draw_from_stock() {
            second_pass.push(game.piles().top(PileId::Waste).unwrap());
        }
        assert_eq!(first_pass, second_pass, "リサイクル後は同じ順番で引けるはず");
        assert_eq!(game.piles().pile(PileId::Waste), waste_before.as_slice());
        assert_eq!(game.stats().recycle_count, 1);
    }

    #[test]
    fn test_full_deck_draw_and_recycle() {
        // 52枚全てがストックにある盤面
        let mut game = board(&[], &[]);
        let initial: Vec<CardId> = game.piles().pile(PileId::Stock).to_vec();
        for _ in 0..DECK_SIZE {
            assert!(game.draw_from_stock());
        }
        assert!(game.piles().pile(PileId::Stock).is_empty());
        let drawn: Vec<CardId> = game.piles().pile(PileId::Waste).to_vec();

        assert!(game.recycle_waste());
        assert_eq!(game.piles().pile(PileId::Stock), initial.as_slice(), "元のストックの並びに戻るはず");
        for _ in 0..DECK_SIZE {
            assert!(game.draw_from_stock());
        }
        assert_eq!(game.piles().pile(PileId::Waste), drawn.as_slice());
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_recycle_empty_waste_is_noop() {
        let mut game = Klondike::with_seed(5, Layout::default());
        assert!(!game.recycle_waste());
        assert_eq!(game.stats().recycle_count, 0);
    }

    #[test]
    fn test_win_detected_on_last_card() {
        let mut foundations: Vec<(usize, Vec<(Suit, Rank)>)> = Vec::new();
        for (i, suit) in Suit::all().iter().enumerate() {
            let take = if *suit == Suit::Club { 12 } else { 13 };
            foundations.push((i, Rank::all()[..take].iter().map(|r| (*suit, *r)).collect()));
        }
        let mut game = board(&[(0, vec![(Suit::Club, Rank::King, true)])], &foundations);

        assert!(!game.is_won(), "51枚ではまだ勝ちではないはず");
        let king = id(Suit::Club, Rank::King);
        assert!(game.can_move_to_foundation(king, 3));
        assert!(game.move_to_foundation(king, 3));
        assert!(game.is_won());
        assert_eq!(game.result(), GameResult::Win);

        game.start_new_game();
        assert_eq!(game.result(), GameResult::None, "新しいゲームで結果はリセットされるはず");
        game.piles().check_invariants().unwrap();
    }

    #[test]
    fn test_random_legal_play_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(99);
        for seed in 0..20 {
            let mut game = Klondike::with_seed(seed, Layout::default());
            for _ in 0..400 {
                // 合法な移動候補を集めて1つ選ぶ
                let mut candidates: Vec<(CardId, bool, usize)> = Vec::new();
                for pile in Piles::all_pile_ids().filter(|p| *p != PileId::Stock) {
                    let cards = game.piles().pile(pile).to_vec();
                    for (i, cid) in cards.iter().enumerate() {
                        let card = game.piles().card(*cid);
                        let is_top = i + 1 == cards.len();
                        if !card.face_up || (!pile.is_tableau() && !is_top) {
                            continue;
                        }
                        for f in 0..FOUNDATION_COUNT {
                            if is_top && game.can_move_to_foundation(*cid, f) {
                                candidates.push((*cid, true, f));
                            }
                        }
                        for t in 0..TABLEAU_COUNT {
                            if game.can_move_to_tableau(*cid, t) {
                                candidates.push((*cid, false, t));
                            }
                        }
                    }
                }
                if candidates.is_empty() || rng.gen_bool(0.3) {
                    if !game.draw_from_stock() {
                        game.recycle_waste();
                    }
                } else {
                    let (cid, to_foundation, index) = candidates[rng.gen_range(0..candidates.len())];
                    if to_foundation {
                        game.move_to_foundation(cid, index);
                    } else {
                        game.move_to_tableau(cid, index);
                    }
                }
                game.piles().check_invariants().unwrap();
                assert_eq!(game.is_won(), game.piles().foundation_count() == DECK_SIZE);
            }
        }
    }
}
