// =============================================================================
// カードモデル
// =============================================================================
// 1枚のトランプカードを表す値型と、スート・ランク・色の定義です。
// カードの同一性は (スート, ランク) の組で決まり、1ゲームにつき各組が
// ちょうど1枚だけ存在します。盤面上では CardId（0〜51）で参照します。
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1デッキのカード枚数
pub const DECK_SIZE: usize = 52;

/// カードのスート（絵柄）
///
/// 並び順は山札生成時の順序（♠ ♥ ♦ ♣）と一致します。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spade,   // ♠ スペード
    Heart,   // ♥ ハート
    Diamond, // ♦ ダイヤ
    Club,    // ♣ クラブ
}

impl Suit {
    /// 全てのスートを山札生成順で取得
    pub fn all() -> [Suit; 4] {
        [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club]
    }

    /// スートの記号を取得
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Spade => "♠",
            Suit::Heart => "♥",
            Suit::Diamond => "♦",
            Suit::Club => "♣",
        }
    }

    /// スートの色（ハート・ダイヤは赤、それ以外は黒）
    pub fn color(&self) -> CardColor {
        match self {
            Suit::Heart | Suit::Diamond => CardColor::Red,
            Suit::Spade | Suit::Club => CardColor::Black,
        }
    }

    fn index(&self) -> u8 {
        match self {
            Suit::Spade => 0,
            Suit::Heart => 1,
            Suit::Diamond => 2,
            Suit::Club => 3,
        }
    }
}

/// カードのランク（A〜K の13段階）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Rank {
    /// 全てのランクを昇順で取得
    pub fn all() -> [Rank; 13] {
        [
            Rank::Ace, Rank::Two, Rank::Three, Rank::Four,
            Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
            Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King,
        ]
    }

    /// ランクの表示文字列を取得
    pub fn display(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    /// 1つ上のランク。King には次がないので None（折り返さない）
    pub fn successor(&self) -> Option<Rank> {
        Rank::all().get(*self as usize).copied()
    }

    /// 1つ下のランク。Ace には前がないので None
    pub fn predecessor(&self) -> Option<Rank> {
        (*self as usize)
            .checked_sub(2)
            .and_then(|i| Rank::all().get(i).copied())
    }
}

/// カードの色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,   // 赤（ハート、ダイヤ）
    Black, // 黒（スペード、クラブ）
}

/// カードの識別子
///
/// `suit_index * 13 + (rank - 1)` で 0〜51 に割り当てられます。
/// 盤面の各パイルはこの ID を保持し、カード本体はカード表に1枚ずつ存在します。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u8);

impl CardId {
    /// スートとランクから ID を求める
    pub fn of(suit: Suit, rank: Rank) -> Self {
        CardId(suit.index() * 13 + (rank as u8 - 1))
    }

    /// カード表でのインデックス
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// カード
///
/// `x` / `y` は描画側のための表示座標で、ルール判定には使いません。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub face_up: bool,
    pub x: f32,
    pub y: f32,
}

impl Card {
    /// 裏向きの新しいカードを作成
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            suit,
            rank,
            face_up: false,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn id(&self) -> CardId {
        CardId::of(self.suit, self.rank)
    }

    pub fn color(&self) -> CardColor {
        self.suit.color()
    }

    /// カードを表向きにする
    pub fn flip_up(&mut self) {
        self.face_up = true;
    }

    /// カードを裏向きにする
    pub fn flip_down(&mut self) {
        self.face_up = false;
    }

    /// 表示座標を設定
    pub fn set_display_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.display(), self.suit.symbol())
    }
}
