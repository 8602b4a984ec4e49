// =============================================================================
// ロガー
// =============================================================================
// `log` ファサードの出力先です。
// WebAssembly機能有効時はブラウザのコンソールへ、それ以外は標準エラーへ出します。
// =============================================================================

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// コンソールロガー
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl ConsoleLogger {
    fn level_prefix(level: Level) -> &'static str {
        match level {
            Level::Error => "[ERROR] ",
            Level::Warn => "[WARN ] ",
            Level::Info => "[INFO ] ",
            Level::Debug => "[DEBUG] ",
            Level::Trace => "[TRACE] ",
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{}[{}] {}",
            Self::level_prefix(record.level()),
            record.module_path().unwrap_or("klondike"),
            record.args()
        );

        #[cfg(feature = "wasm")]
        {
            let value = wasm_bindgen::JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&value),
                Level::Warn => web_sys::console::warn_1(&value),
                _ => web_sys::console::log_1(&value),
            }
        }

        #[cfg(not(feature = "wasm"))]
        eprintln!("{}", line);
    }

    fn flush(&self) {}
}

/// ロガーを登録する。2回目以降の呼び出しはエラー
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
