// =============================================================================
// パイルストア（盤面のカード配置）
// =============================================================================
// ストック・ウェイスト・ファウンデーション4組・タブロー7列を保持します。
//
// 設計方針：
// - カード本体は CardId で引けるカード表に1枚ずつ置き、各パイルは ID の列を持つ
// - 各カードは「今どのパイルの何番目にいるか」を Slot として逆引きできる
//   （所属パイルの線形探索をしない）
// - パイルを書き換える操作はこのモジュールの中だけで行い、Slot を常に同期させる
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId, DECK_SIZE};
use crate::error::KlondikeError;
use crate::layout::Layout;

/// ファウンデーションの数
pub const FOUNDATION_COUNT: usize = 4;

/// タブローの列数
pub const TABLEAU_COUNT: usize = 7;

/// パイルの識別子
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum PileId {
    /// 山札（裏向き）
    Stock,
    /// 捨て札（表向き）
    Waste,
    /// 組札（A〜K を同じスートで積む）
    Foundation(u8),
    /// 場札（K〜A を色違いで積む）
    Tableau(u8),
}

impl PileId {
    /// 範囲チェック付きでファウンデーションの ID を作る
    pub fn foundation(index: usize) -> Result<PileId, KlondikeError> {
        if index < FOUNDATION_COUNT {
            Ok(PileId::Foundation(index as u8))
        } else {
            Err(KlondikeError::InvalidPileIndex {
                kind: "foundation",
                index,
                max: FOUNDATION_COUNT - 1,
            })
        }
    }

    /// 範囲チェック付きでタブローの ID を作る
    pub fn tableau(index: usize) -> Result<PileId, KlondikeError> {
        if index < TABLEAU_COUNT {
            Ok(PileId::Tableau(index as u8))
        } else {
            Err(KlondikeError::InvalidPileIndex {
                kind: "tableau",
                index,
                max: TABLEAU_COUNT - 1,
            })
        }
    }

    pub fn is_tableau(&self) -> bool {
        matches!(self, PileId::Tableau(_))
    }

    /// 場所名を文字列で取得（ログ用）
    pub fn name(&self) -> String {
        match self {
            PileId::Stock => "ストック".to_string(),
            PileId::Waste => "ウェイスト".to_string(),
            PileId::Foundation(i) => format!("ファウンデーション{}", i + 1),
            PileId::Tableau(i) => format!("タブロー{}", i + 1),
        }
    }
}

/// カードの現在位置（逆引き用）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub pile: PileId,
    pub index: usize,
}

/// 盤面全体のカード配置
#[derive(Debug, Clone)]
pub struct Piles {
    /// CardId 順に並んだカード表
    cards: Vec<Card>,
    /// CardId ごとの現在位置
    slots: Vec<Slot>,
    stock: Vec<CardId>,
    waste: Vec<CardId>,
    foundations: [Vec<CardId>; FOUNDATION_COUNT],
    tableau: [Vec<CardId>; TABLEAU_COUNT],
}

impl Piles {
    /// カード表と各パイルの中身から盤面を組み立てる
    ///
    /// `cards` は任意の順序でよく、内部で CardId 順に並べ直します。
    /// 全52枚がどこかのパイルにちょうど1回ずつ現れている必要があります。
    pub fn from_parts(
        cards: Vec<Card>,
        stock: Vec<CardId>,
        waste: Vec<CardId>,
        foundations: [Vec<CardId>; FOUNDATION_COUNT],
        tableau: [Vec<CardId>; TABLEAU_COUNT],
    ) -> Result<Self, KlondikeError> {
        let mut table: Vec<Option<Card>> = vec![None; DECK_SIZE];
        for card in cards {
            let index = card.id().index();
            if table[index].is_some() {
                return Err(KlondikeError::InvariantViolation(format!(
                    "duplicate card {}",
                    card
                )));
            }
            table[index] = Some(card);
        }
        let cards = table
            .into_iter()
            .enumerate()
            .map(|(i, card)| {
                card.ok_or_else(|| {
                    KlondikeError::InvariantViolation(format!("card id {} missing", i))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut piles = Self {
            cards,
            slots: vec![Slot { pile: PileId::Stock, index: usize::MAX }; DECK_SIZE],
            stock,
            waste,
            foundations,
            tableau,
        };
        piles.rebuild_slots()?;
        Ok(piles)
    }

    /// 全パイルを走査して Slot を作り直す。重複や欠落があればエラー
    fn rebuild_slots(&mut self) -> Result<(), KlondikeError> {
        let mut seen = [false; DECK_SIZE];
        let mut slots = self.slots.clone();
        for pile in Self::all_pile_ids() {
            for (index, id) in self.pile(pile).iter().enumerate() {
                let i = id.index();
                if i >= DECK_SIZE || seen[i] {
                    return Err(KlondikeError::InvariantViolation(format!(
                        "card id {} placed twice or out of range",
                        i
                    )));
                }
                seen[i] = true;
                slots[i] = Slot { pile, index };
            }
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(KlondikeError::InvariantViolation(format!(
                "card id {} is not in any pile",
                missing
            )));
        }
        self.slots = slots;
        Ok(())
    }

    /// 全パイルの ID を固定順（ストック、ウェイスト、F0〜3、T0〜6）で列挙
    pub fn all_pile_ids() -> impl Iterator<Item = PileId> {
        [PileId::Stock, PileId::Waste]
            .into_iter()
            .chain((0..FOUNDATION_COUNT as u8).map(PileId::Foundation))
            .chain((0..TABLEAU_COUNT as u8).map(PileId::Tableau))
    }

    // -------------------------------------------------------------------------
    // 参照系
    // -------------------------------------------------------------------------

    /// パイルの中身（下から上の順）
    pub fn pile(&self, pile: PileId) -> &[CardId] {
        match pile {
            PileId::Stock => &self.stock,
            PileId::Waste => &self.waste,
            PileId::Foundation(i) => &self.foundations[i as usize],
            PileId::Tableau(i) => &self.tableau[i as usize],
        }
    }

    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id.index()]
    }

    /// カードの現在位置
    pub fn slot(&self, id: CardId) -> Slot {
        self.slots[id.index()]
    }

    /// パイルの一番上のカード
    pub fn top(&self, pile: PileId) -> Option<CardId> {
        self.pile(pile).last().copied()
    }

    pub fn top_card(&self, pile: PileId) -> Option<&Card> {
        self.top(pile).map(|id| self.card(id))
    }

    /// カードがそのパイルの一番上にあるか
    pub fn is_top(&self, id: CardId) -> bool {
        let slot = self.slot(id);
        slot.index + 1 == self.pile(slot.pile).len()
    }

    /// ファウンデーションに積まれたカードの総数
    pub fn foundation_count(&self) -> usize {
        self.foundations.iter().map(Vec::len).sum()
    }

    /// タブロー列の表向き部分の開始位置（全て裏向きか空なら列の長さ）
    pub fn face_up_suffix_start(&self, tableau_index: usize) -> usize {
        let pile = &self.tableau[tableau_index];
        pile.iter()
            .position(|id| self.card(*id).face_up)
            .unwrap_or(pile.len())
    }

    /// `id` から上のカード（ドラッグで一緒に動く範囲）
    pub fn stack_from(&self, id: CardId) -> &[CardId] {
        let slot = self.slot(id);
        &self.pile(slot.pile)[slot.index..]
    }

    // -------------------------------------------------------------------------
    // 変更系（Slot を同期させる）
    // -------------------------------------------------------------------------

    fn pile_mut(&mut self, pile: PileId) -> &mut Vec<CardId> {
        match pile {
            PileId::Stock => &mut self.stock,
            PileId::Waste => &mut self.waste,
            PileId::Foundation(i) => &mut self.foundations[i as usize],
            PileId::Tableau(i) => &mut self.tableau[i as usize],
        }
    }

    pub(crate) fn card_mut(&mut self, id: CardId) -> &mut Card {
        &mut self.cards[id.index()]
    }

    /// パイルの一番上にカードを積む
    pub(crate) fn push(&mut self, pile: PileId, id: CardId) {
        let target = self.pile_mut(pile);
        target.push(id);
        let index = target.len() - 1;
        self.slots[id.index()] = Slot { pile, index };
    }

    /// パイルの一番上からカードを取り出す
    ///
    /// 取り出したカードの Slot は呼び出し側が `push` するまで古いままです。
    pub(crate) fn pop(&mut self, pile: PileId) -> Option<CardId> {
        self.pile_mut(pile).pop()
    }

    /// `at` 番目から上をまとめて取り出す（順序は保持）
    pub(crate) fn split_off(&mut self, pile: PileId, at: usize) -> Vec<CardId> {
        let source = self.pile_mut(pile);
        let at = at.min(source.len());
        source.split_off(at)
    }

    /// タブローの一番上が裏向きなら表にする。表にした場合 true
    pub(crate) fn reveal_top(&mut self, pile: PileId) -> bool {
        if !pile.is_tableau() {
            return false;
        }
        match self.top(pile) {
            Some(id) if !self.card(id).face_up => {
                self.card_mut(id).flip_up();
                true
            }
            _ => false,
        }
    }

    /// 全カードの表示座標をレイアウトから再計算する
    pub fn relayout(&mut self, layout: &Layout) {
        for i in 0..DECK_SIZE {
            let slot = self.slots[i];
            let (x, y) = layout.card_position(slot.pile, slot.index);
            self.cards[i].set_display_position(x, y);
        }
    }

    // -------------------------------------------------------------------------
    // 不変条件
    // -------------------------------------------------------------------------

    /// 盤面の不変条件をすべて検査する
    ///
    /// - 52枚がちょうど1回ずつどこかのパイルにある
    /// - Slot が実際の配置と一致している
    /// - ストックは全て裏向き、ウェイストは全て表向き
    /// - ファウンデーションは同スートで A から1ずつ昇順
    /// - タブローの表向き部分は色違いで1ずつ降順、表向きの後に裏向きはない
    /// - 空でないタブローの一番上は表向き
    pub fn check_invariants(&self) -> Result<(), KlondikeError> {
        let violation = |msg: String| Err(KlondikeError::InvariantViolation(msg));

        let mut seen = [false; DECK_SIZE];
        for pile in Self::all_pile_ids() {
            for (index, id) in self.pile(pile).iter().enumerate() {
                if seen[id.index()] {
                    return violation(format!("{} appears twice", self.card(*id)));
                }
                seen[id.index()] = true;
                if self.slot(*id) != (Slot { pile, index }) {
                    return violation(format!("stale slot for {}", self.card(*id)));
                }
            }
        }
        if seen.iter().any(|s| !s) {
            return violation("a card is missing from every pile".to_string());
        }

        if let Some(id) = self.stock.iter().find(|id| self.card(**id).face_up) {
            return violation(format!("face-up card {} in stock", self.card(*id)));
        }
        if let Some(id) = self.waste.iter().find(|id| !self.card(**id).face_up) {
            return violation(format!("face-down card {} in waste", self.card(*id)));
        }

        for (f, pile) in self.foundations.iter().enumerate() {
            if let Some(first) = pile.first() {
                if self.card(*first).rank != crate::card::Rank::Ace {
                    return violation(format!("foundation {} does not start with an ace", f));
                }
            }
            for pair in pile.windows(2) {
                let (prev, next) = (self.card(pair[0]), self.card(pair[1]));
                if next.suit != prev.suit || prev.rank.successor() != Some(next.rank) {
                    return violation(format!("foundation {} breaks at {} -> {}", f, prev, next));
                }
            }
        }

        for (t, pile) in self.tableau.iter().enumerate() {
            let start = self.face_up_suffix_start(t);
            if pile[start..].iter().any(|id| !self.card(*id).face_up) {
                return violation(format!("tableau {} has a face-down card above a face-up one", t));
            }
            for pair in pile[start..].windows(2) {
                let (upper, lower) = (self.card(pair[0]), self.card(pair[1]));
                if upper.color() == lower.color() || upper.rank.predecessor() != Some(lower.rank) {
                    return violation(format!("tableau {} breaks at {} -> {}", t, upper, lower));
                }
            }
            if let Some(top) = pile.last() {
                if !self.card(*top).face_up {
                    return violation(format!("tableau {} top card is face down", t));
                }
            }
        }

        Ok(())
    }
}
