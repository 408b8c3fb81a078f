//! High-resolution page clock.

use davui_core::Clock;

/// `performance.now()`, falling back to `Date.now()` where the Performance
/// API is missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}
