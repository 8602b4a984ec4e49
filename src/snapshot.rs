// =============================================================================
// 描画用スナップショット
// =============================================================================
// 描画側が毎フレーム読むための読み取り専用の盤面表現です。
// JSON にしてそのまま JS に渡せるようにしています。
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::card::{CardId, Rank, Suit};
use crate::error::KlondikeError;
use crate::game::{GameResult, GameStats, Klondike};
use crate::interaction::DragState;
use crate::piles::{PileId, Piles, FOUNDATION_COUNT, TABLEAU_COUNT};

/// 1枚分の表示情報
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardView {
    pub id: u8,
    pub suit: Suit,
    pub rank: Rank,
    /// 表示用の文字列（例: "10♥"）
    pub label: String,
    pub face_up: bool,
    pub x: f32,
    pub y: f32,
    /// ドラッグ中で、元の位置には描かないカード
    pub dragging: bool,
}

/// ドラッグ中の束の表示情報
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragView {
    pub source: PileId,
    pub offset_x: f32,
    pub offset_y: f32,
    /// ポインタに追従させた位置のカード（先頭から順）
    pub cards: Vec<CardView>,
}

/// 盤面全体のスナップショット
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub stock: Vec<CardView>,
    pub waste: Vec<CardView>,
    pub foundations: Vec<Vec<CardView>>,
    pub tableau: Vec<Vec<CardView>>,
    pub drag: Option<DragView>,
    pub result: GameResult,
    pub stats: GameStats,
}

impl GameSnapshot {
    /// 現在の盤面と操作状態から作る
    pub fn capture(game: &Klondike, drag: &DragState, pointer: (f32, f32)) -> Self {
        let piles = game.piles();
        let dragging: &[CardId] = match drag {
            DragState::Dragging(d) => &d.stack,
            DragState::Idle => &[],
        };

        let pile_view = |pile: PileId| -> Vec<CardView> {
            piles
                .pile(pile)
                .iter()
                .map(|id| card_view(piles, *id, dragging.contains(id)))
                .collect()
        };

        let drag = match drag {
            DragState::Dragging(d) => {
                let fan = game.layout().tableau_fan;
                let cards = d
                    .stack
                    .iter()
                    .enumerate()
                    .map(|(i, id)| {
                        let mut view = card_view(piles, *id, true);
                        view.x = pointer.0 - d.offset_x;
                        view.y = pointer.1 - d.offset_y + i as f32 * fan;
                        view
                    })
                    .collect();
                Some(DragView {
                    source: d.source,
                    offset_x: d.offset_x,
                    offset_y: d.offset_y,
                    cards,
                })
            }
            DragState::Idle => None,
        };

        Self {
            stock: pile_view(PileId::Stock),
            waste: pile_view(PileId::Waste),
            foundations: (0..FOUNDATION_COUNT as u8).map(|i| pile_view(PileId::Foundation(i))).collect(),
            tableau: (0..TABLEAU_COUNT as u8).map(|i| pile_view(PileId::Tableau(i))).collect(),
            drag,
            result: game.result(),
            stats: game.stats(),
        }
    }

    pub fn to_json(&self) -> Result<String, KlondikeError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn card_view(piles: &Piles, id: CardId, dragging: bool) -> CardView {
    let card = piles.card(id);
    CardView {
        id: id.0,
        suit: card.suit,
        rank: card.rank,
        label: card.to_string(),
        face_up: card.face_up,
        x: card.x,
        y: card.y,
        dragging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::GameConfig;
    use crate::interaction::Table;

    #[test]
    fn test_snapshot_mirrors_piles() {
        let table = Table::with_seed(8, GameConfig::default(), ManualClock::new(0));
        let snap = table.snapshot();
        assert_eq!(snap.stock.len(), 24);
        assert!(snap.waste.is_empty());
        assert_eq!(snap.foundations.len(), 4);
        assert_eq!(snap.tableau.len(), 7);
        for (i, pile) in snap.tableau.iter().enumerate() {
            assert_eq!(pile.len(), i + 1);
            assert!(pile.last().unwrap().face_up);
        }
        assert!(snap.drag.is_none());
        assert_eq!(snap.result, GameResult::None);
    }

    #[test]
    fn test_snapshot_follows_pointer_while_dragging() {
        let mut table = Table::with_seed(8, GameConfig::default(), ManualClock::new(0));
        let top = *table.game().piles().pile(PileId::Tableau(6)).last().unwrap();
        let card = table.game().piles().card(top).clone();
        table.pointer_press(card.x + 10.0, card.y + 12.0);
        table.pointer_move(400.0, 300.0);

        let snap = table.snapshot();
        let drag = snap.drag.expect("ドラッグ中のはず");
        assert_eq!(drag.source, PileId::Tableau(6));
        assert_eq!(drag.cards.len(), 1);
        assert_eq!((drag.cards[0].x, drag.cards[0].y), (390.0, 288.0));
        assert!(snap.tableau[6].last().unwrap().dragging, "元の位置のカードには印が付くはず");
    }

    #[test]
    fn test_snapshot_json_shape() {
        let table = Table::with_seed(1, GameConfig::default(), ManualClock::new(0));
        let json = table.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"], "none");
        assert_eq!(value["stock"].as_array().unwrap().len(), 24);
        assert!(value["tableau"][0][0]["label"].is_string());
        assert!(value["drag"].is_null());
    }
}
