// =============================================================================
// 移動ルールの判定
// =============================================================================
// 盤面を変更しない純粋な述語だけを置きます。
// タブロー間で複数枚を動かす場合も、判定に使うのは先頭（一番下）の1枚だけです。
// =============================================================================

use crate::card::{Card, Rank};
use crate::piles::{PileId, Piles};

/// カードを組札 `foundation_index` の上に置けるか
///
/// 空なら A のみ。そうでなければ同じスートで1つ上のランクのみ（K の次はない）。
pub fn can_move_to_foundation(piles: &Piles, card: &Card, foundation_index: usize) -> bool {
    let Ok(pile) = PileId::foundation(foundation_index) else {
        return false;
    };
    can_place_on_foundation(card, piles.top_card(pile))
}

/// カードを場札 `tableau_index` の上に置けるか
///
/// 空なら K のみ。そうでなければ色違いで1つ下のランクのみ（A の前はない）。
pub fn can_move_to_tableau(piles: &Piles, card: &Card, tableau_index: usize) -> bool {
    let Ok(pile) = PileId::tableau(tableau_index) else {
        return false;
    };
    can_place_on_tableau(card, piles.top_card(pile))
}

pub fn can_place_on_foundation(card: &Card, top: Option<&Card>) -> bool {
    match top {
        None => card.rank == Rank::Ace,
        Some(top) => card.suit == top.suit && top.rank.successor() == Some(card.rank),
    }
}

pub fn can_place_on_tableau(card: &Card, top: Option<&Card>) -> bool {
    match top {
        None => card.rank == Rank::King,
        Some(top) => card.color() != top.color() && top.rank.predecessor() == Some(card.rank),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardId, Suit};
    use crate::piles::{FOUNDATION_COUNT, TABLEAU_COUNT};

    fn card(suit: Suit, rank: Rank) -> Card {
        let mut card = Card::new(suit, rank);
        card.flip_up();
        card
    }

    /// 指定したカードだけを組札0・場札0に置き、残りをストックに置いた盤面
    fn piles_with(foundation0: &[(Suit, Rank)], tableau0: &[(Suit, Rank)]) -> Piles {
        let mut cards = Vec::new();
        for suit in Suit::all() {
            for rank in Rank::all() {
                cards.push(Card::new(suit, rank));
            }
        }
        for c in cards.iter_mut() {
            if foundation0.contains(&(c.suit, c.rank)) || tableau0.contains(&(c.suit, c.rank)) {
                c.flip_up();
            }
        }
        let foundation: Vec<CardId> = foundation0.iter().map(|(s, r)| CardId::of(*s, *r)).collect();
        let tableau: Vec<CardId> = tableau0.iter().map(|(s, r)| CardId::of(*s, *r)).collect();
        let stock: Vec<CardId> = cards
            .iter()
            .map(Card::id)
            .filter(|id| !foundation.contains(id) && !tableau.contains(id))
            .collect();
        let mut foundations: [Vec<CardId>; FOUNDATION_COUNT] = Default::default();
        foundations[0] = foundation;
        let mut tableaus: [Vec<CardId>; TABLEAU_COUNT] = Default::default();
        tableaus[0] = tableau;
        Piles::from_parts(cards, stock, vec![], foundations, tableaus).unwrap()
    }

    #[test]
    fn test_empty_foundation_accepts_only_ace() {
        let piles = piles_with(&[], &[]);
        assert!(can_move_to_foundation(&piles, &card(Suit::Spade, Rank::Ace), 0), "空の組札に A♠ は置けるはず");
        assert!(!can_move_to_foundation(&piles, &card(Suit::Spade, Rank::Two), 0), "空の組札に 2♠ は置けないはず");
    }

    #[test]
    fn test_foundation_requires_same_suit_successor() {
        let piles = piles_with(&[(Suit::Spade, Rank::Ace)], &[]);
        assert!(can_move_to_foundation(&piles, &card(Suit::Spade, Rank::Two), 0), "A♠ の上に 2♠ は置けるはず");
        assert!(!can_move_to_foundation(&piles, &card(Suit::Heart, Rank::Two), 0), "A♠ の上に 2♥ は置けないはず（スート違い）");
        assert!(!can_move_to_foundation(&piles, &card(Suit::Spade, Rank::Three), 0), "ランクを飛ばしてはいけない");
    }

    #[test]
    fn test_foundation_caps_at_king() {
        let full: Vec<(Suit, Rank)> = Rank::all().iter().map(|r| (Suit::Club, *r)).collect();
        let piles = piles_with(&full, &[]);
        for rank in Rank::all() {
            for suit in Suit::all() {
                assert!(!can_move_to_foundation(&piles, &card(suit, rank), 0), "K の上には何も置けないはず");
            }
        }
    }

    #[test]
    fn test_empty_tableau_accepts_only_king() {
        let piles = piles_with(&[], &[]);
        assert!(can_move_to_tableau(&piles, &card(Suit::Heart, Rank::King), 0), "空の列に K♥ は置けるはず");
        assert!(!can_move_to_tableau(&piles, &card(Suit::Heart, Rank::Queen), 0), "空の列に Q♥ は置けないはず");
    }

    #[test]
    fn test_tableau_requires_alternating_color_and_descending_rank() {
        let piles = piles_with(&[], &[(Suit::Club, Rank::Five)]);
        assert!(can_move_to_tableau(&piles, &card(Suit::Diamond, Rank::Four), 0), "5♣ の上に 4♦ は置けるはず");
        assert!(!can_move_to_tableau(&piles, &card(Suit::Club, Rank::Four), 0), "5♣ の上に 4♣ は置けないはず（同色）");
        assert!(!can_move_to_tableau(&piles, &card(Suit::Heart, Rank::Three), 0), "ランク違いは置けないはず");
        assert!(!can_move_to_tableau(&piles, &card(Suit::Heart, Rank::Six), 0), "大きいランクは置けないはず");
    }

    #[test]
    fn test_nothing_goes_below_an_ace() {
        let piles = piles_with(&[], &[(Suit::Heart, Rank::Ace)]);
        for suit in Suit::all() {
            for rank in Rank::all() {
                assert!(!can_move_to_tableau(&piles, &card(suit, rank), 0));
            }
        }
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let piles = piles_with(&[], &[]);
        assert!(!can_move_to_foundation(&piles, &card(Suit::Spade, Rank::Ace), 4));
        assert!(!can_move_to_tableau(&piles, &card(Suit::Spade, Rank::King), 7));
    }
}
