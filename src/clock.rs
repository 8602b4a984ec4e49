// =============================================================================
// 時計
// =============================================================================
// ダブルクリック判定用の単調増加するミリ秒時計です。
// 操作層はこのトレイト越しに時刻を読むだけで、タイマーは使いません。
// テストでは ManualClock で時刻を進めます。
// =============================================================================

use std::cell::Cell;
use std::time::Instant;

/// ミリ秒単位の単調時計
pub trait Clock {
    /// 基準時点からの経過ミリ秒
    fn now_ms(&self) -> u64;
}

/// `std::time::Instant` を使うネイティブ用の時計
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// 手動で進める時計（テスト・デモ用）
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: Cell::new(start_ms) }
    }

    /// 時刻を進める
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// 前回の値より戻らないように読み取り値を丸める
#[cfg_attr(not(feature = "wasm"), allow(dead_code))]
fn clamp_forward(last: &Cell<u64>, raw: u64) -> u64 {
    let now = raw.max(last.get());
    last.set(now);
    now
}

/// ブラウザの `performance.now()` を読む時計（WebAssembly機能有効時のみ）
///
/// `performance` が使えない環境では `Date.now()` に切り替えますが、
/// 時刻が戻った場合は前回の値を返し続けます。
#[cfg(feature = "wasm")]
pub struct JsClock {
    performance: Option<web_sys::Performance>,
    last: Cell<u64>,
}

#[cfg(feature = "wasm")]
impl JsClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|window| window.performance()),
            last: Cell::new(0),
        }
    }
}

#[cfg(feature = "wasm")]
impl Default for JsClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "wasm")]
impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        let raw = match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        };
        clamp_forward(&self.last, raw as u64)
    }
}
