// =============================================================================
// エラー型
// =============================================================================
// ゲーム進行中の不正な移動はエラーではなく「何もしない」扱いです。
// ここで定義するのはホスト側（JS・設定ファイル・テスト）から見た異常だけです。
// =============================================================================

/// クロンダイクのエラー
#[derive(Debug, thiserror::Error)]
pub enum KlondikeError {
    #[error("pile index out of range: {kind} {index} (max {max})")]
    InvalidPileIndex {
        kind: &'static str,
        index: usize,
        max: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
