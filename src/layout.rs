// =============================================================================
// 盤面レイアウト
// =============================================================================
// 各パイルの配置矩形とカードの表示座標を計算します。
// 描画側と当たり判定がこの同じ計算式を共有しないと、見た目とクリック位置が
// ずれてしまうので、座標計算はすべてここに集めています。
//
//   [Stock] [Waste] [    ] [F0] [F1] [F2] [F3]
//   [T0]    [T1]    [T2]   [T3] [T4] [T5] [T6]
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::piles::PileId;

pub const CARD_WIDTH: f32 = 71.0;
pub const CARD_HEIGHT: f32 = 96.0;
pub const CARD_SPACING: f32 = 15.0;
pub const MARGIN: f32 = 15.0;
/// タブローでカードを下にずらす量
pub const TABLEAU_FAN: f32 = 20.0;

/// 軸平行な矩形
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// `None` は下方向に無制限（タブローのドロップ領域）
    pub height: Option<f32>,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height: Some(height) }
    }

    /// 点が矩形内にあるか（境界を含む）
    pub fn contains(&self, px: f32, py: f32) -> bool {
        let within_x = px >= self.x && px <= self.x + self.width;
        let within_y = match self.height {
            Some(h) => py >= self.y && py <= self.y + h,
            None => py >= self.y,
        };
        within_x && within_y
    }
}

/// レイアウト設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Layout {
    pub card_width: f32,
    pub card_height: f32,
    pub card_spacing: f32,
    pub margin: f32,
    pub tableau_fan: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            card_width: CARD_WIDTH,
            card_height: CARD_HEIGHT,
            card_spacing: CARD_SPACING,
            margin: MARGIN,
            tableau_fan: TABLEAU_FAN,
        }
    }
}

impl Layout {
    /// 1列分の横幅（カード幅 + 間隔）
    fn column_step(&self) -> f32 {
        self.card_width + self.card_spacing
    }

    fn column_x(&self, column: usize) -> f32 {
        self.margin + column as f32 * self.column_step()
    }

    fn tableau_row_y(&self) -> f32 {
        self.margin + self.card_height + self.card_spacing
    }

    fn card_rect_at(&self, x: f32, y: f32) -> Rect {
        Rect::new(x, y, self.card_width, self.card_height)
    }

    pub fn stock_rect(&self) -> Rect {
        self.card_rect_at(self.column_x(0), self.margin)
    }

    pub fn waste_rect(&self) -> Rect {
        self.card_rect_at(self.column_x(1), self.margin)
    }

    /// ファウンデーション i の枠（上段の4列目から右へ並ぶ）
    pub fn foundation_rect(&self, index: usize) -> Rect {
        self.card_rect_at(self.column_x(index + 3), self.margin)
    }

    /// タブロー i のドロップ領域。列の開始行から下は無制限
    pub fn tableau_slot(&self, index: usize) -> Rect {
        Rect {
            x: self.column_x(index),
            y: self.tableau_row_y(),
            width: self.card_width,
            height: None,
        }
    }

    /// パイル内の位置からカードの表示座標を求める
    pub fn card_position(&self, pile: PileId, index: usize) -> (f32, f32) {
        match pile {
            PileId::Stock => (self.column_x(0), self.margin),
            PileId::Waste => (self.column_x(1), self.margin),
            PileId::Foundation(i) => (self.column_x(i as usize + 3), self.margin),
            PileId::Tableau(i) => (
                self.column_x(i as usize),
                self.tableau_row_y() + index as f32 * self.tableau_fan,
            ),
        }
    }

    /// 表示座標にあるカードの矩形
    pub fn card_rect(&self, x: f32, y: f32) -> Rect {
        self.card_rect_at(x, y)
    }
}
