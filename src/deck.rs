// =============================================================================
// デッキ生成と配布
// =============================================================================
// 52枚のカードを作ってシャッフルし、クロンダイクの初期配置に配ります。
//
// 初期配置：
// - タブロー: 7列、左から1〜7枚（各列の一番上だけ表向き）
// - ストック: 残り24枚（全て裏向き）
// - ウェイスト、ファウンデーション: 空
// =============================================================================

use rand::Rng;

use crate::card::{Card, CardId, Rank, Suit};
use crate::error::KlondikeError;
use crate::piles::{Piles, TABLEAU_COUNT};

/// シャッフル済みの52枚を作る
///
/// 全て裏向きで生成し、Fisher–Yates で一様に並べ替えます
/// （最後の要素から1番目まで、`[0, i]` から一様に選んだ位置と交換）。
pub fn build_shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(crate::card::DECK_SIZE);
    for suit in Suit::all() {
        for rank in Rank::all() {
            deck.push(Card::new(suit, rank));
        }
    }

    for i in (1..deck.len()).rev() {
        let j = rng.gen_range(0..=i);
        deck.swap(i, j);
    }

    deck
}

/// シャッフル済みのデッキをクロンダイクの初期配置に配る
///
/// デッキの末尾から1枚ずつ取り、タブロー i に i+1 枚を配ります。
/// 各列の最後に配ったカードだけを表向きにし、残りはそのままストックになります
/// （デッキの末尾がストックの一番上）。
pub fn deal(deck: Vec<Card>) -> Result<Piles, KlondikeError> {
    let mut cards = deck;
    for card in cards.iter_mut() {
        card.flip_down();
    }

    // デッキ上の位置で配る。`next` より前がストックに残る
    let mut next = cards.len();
    let mut tableau: [Vec<CardId>; TABLEAU_COUNT] = Default::default();
    for (column, pile) in tableau.iter_mut().enumerate() {
        for row in 0..=column {
            next = next.checked_sub(1).ok_or_else(|| {
                KlondikeError::InvariantViolation("deck ran out while dealing".to_string())
            })?;
            let card = &mut cards[next];
            if row == column {
                card.flip_up();
            }
            pile.push(card.id());
        }
    }
    let stock: Vec<CardId> = cards[..next].iter().map(Card::id).collect();

    log::debug!(
        "📋 クロンダイク配布完了: タブロー{}枚, ストック{}枚",
        crate::card::DECK_SIZE - stock.len(),
        stock.len()
    );

    Piles::from_parts(cards, stock, Vec::new(), Default::default(), tableau)
}
