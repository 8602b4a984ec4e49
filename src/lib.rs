// =============================================================================
// WASM クロンダイク - メインライブラリ
// =============================================================================
// 1人用クロンダイク・ソリティアのルールと操作の中核です。
// 描画（Canvas への描画、文字レイアウト）は JS 側の責務で、このクレートは
// 入力イベントを受け取って盤面を更新し、毎フレーム読めるスナップショットを
// 提供するだけです。
//
// 設計思想：
// - 盤面・ドラッグ状態・勝敗フラグは1つのセッション構造体が所有する
// - カードは CardId で識別し、所属パイルは逆引き表で O(1) に求める
// - 時刻は注入された時計から読み、タイマーは使わない（テストで決定的）
// - 不正な移動はエラーではなく「何もしない」
// =============================================================================

pub mod card;
pub mod clock;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod interaction;
pub mod layout;
pub mod logging;
pub mod piles;
pub mod rules;
pub mod snapshot;

pub use card::{Card, CardColor, CardId, Rank, Suit};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::GameConfig;
pub use error::KlondikeError;
pub use game::{GameResult, GameStats, Klondike};
pub use interaction::{DragState, DropOutcome, PressOutcome, Table};
pub use layout::Layout;
pub use piles::{PileId, Piles};
pub use snapshot::GameSnapshot;

// WebAssembly機能が有効な場合のみインポート
#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// WebAssembly初期化時に実行される関数（WebAssembly機能有効時のみ）
// パニック時のエラー情報をブラウザのコンソールに出力するよう設定
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // ロガーが既に登録済みでも動作に支障はない
    let _ = logging::init(log::LevelFilter::Info);
    log::info!("🎮 WASM クロンダイク初期化完了！");
}

// =============================================================================
// パブリックAPI：JavaScriptから呼び出し可能なクラス
// =============================================================================

/// JS 側から操作するゲーム卓（WebAssembly機能有効時のみ）
///
/// JS はマウス・キーイベントをそのまま渡し、毎フレーム `state_json` を読んで描画します。
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmKlondike {
    table: Table<clock::JsClock>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmKlondike {
    /// デフォルト設定で新しいゲームを開始
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmKlondike {
        WasmKlondike {
            table: Table::new(GameConfig::default(), clock::JsClock::new()),
        }
    }

    /// JSON の設定で新しいゲームを開始
    pub fn with_config(config_json: &str) -> Result<WasmKlondike, JsValue> {
        let config = GameConfig::from_json(config_json).map_err(to_js_error)?;
        Ok(WasmKlondike {
            table: Table::new(config, clock::JsClock::new()),
        })
    }

    /// マウス押下。何かが起きた場合 true
    pub fn pointer_press(&mut self, x: f32, y: f32) -> bool {
        self.table.pointer_press(x, y) != PressOutcome::Ignored
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.table.pointer_move(x, y);
    }

    /// マウスを離す。カードが移動した場合 true
    pub fn pointer_release(&mut self, x: f32, y: f32) -> bool {
        matches!(
            self.table.pointer_release(x, y),
            DropOutcome::ToFoundation(_) | DropOutcome::ToTableau(_)
        )
    }

    /// キー入力（先頭の1文字だけを見る）
    pub fn key_command(&mut self, key: &str) -> bool {
        key.chars().next().map_or(false, |ch| self.table.key_command(ch))
    }

    pub fn new_game(&mut self) {
        self.table.request_new_game();
    }

    /// 描画用の盤面状態を JSON 文字列で返す
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.table.snapshot().to_json().map_err(to_js_error)
    }

    pub fn is_won(&self) -> bool {
        self.table.game().is_won()
    }
}

#[cfg(feature = "wasm")]
impl Default for WasmKlondike {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "wasm")]
fn to_js_error(err: KlondikeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// =============================================================================
// WebAssemblyメモリの最適化
// =============================================================================

// 軽量なアロケータを使用（WebAssembly向け最適化）
#[cfg(all(feature = "wasm", feature = "wee_alloc"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;
