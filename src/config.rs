// =============================================================================
// ゲーム設定
// =============================================================================
// ダブルクリック判定の時間窓と盤面レイアウトをまとめた設定です。
// JSON から読み込めるようにしておき、描画側と同じ値を共有します。
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::KlondikeError;
use crate::layout::Layout;

/// ダブルクリックとみなす最大間隔（ミリ秒）
pub const DOUBLE_CLICK_DELAY_MS: u64 = 300;

/// ゲーム設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// ダブルクリック判定の時間窓（ミリ秒）
    pub double_click_ms: u64,

    /// 盤面レイアウト
    pub layout: Layout,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            double_click_ms: DOUBLE_CLICK_DELAY_MS,
            layout: Layout::default(),
        }
    }
}

impl GameConfig {
    /// JSON 文字列から設定を読み込む（省略した項目はデフォルト値）
    pub fn from_json(json: &str) -> Result<Self, KlondikeError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定値の妥当性をチェック
    pub fn validate(&self) -> Result<(), KlondikeError> {
        let layout = &self.layout;
        let sizes = [
            layout.card_width,
            layout.card_height,
            layout.card_spacing,
            layout.margin,
            layout.tableau_fan,
        ];
        if sizes.iter().any(|v| !v.is_finite()) {
            return Err(KlondikeError::InvalidConfig(
                "layout values must be finite numbers".to_string(),
            ));
        }
        if layout.card_width <= 0.0 || layout.card_height <= 0.0 {
            return Err(KlondikeError::InvalidConfig(format!(
                "card size must be positive, got {}x{}",
                layout.card_width, layout.card_height
            )));
        }
        if layout.tableau_fan < 0.0 || layout.card_spacing < 0.0 || layout.margin < 0.0 {
            return Err(KlondikeError::InvalidConfig(
                "spacing, margin and tableau fan must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
