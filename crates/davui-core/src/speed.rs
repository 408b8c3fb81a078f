//! Transfer-rate smoothing and remaining-time formatting.

use crate::config::ONE_DAY_SECS;

/// Bytes transferred so far, observed at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSample {
    /// Monotonic timestamp in milliseconds.
    pub at_ms: f64,
    /// Cumulative bytes at that time.
    pub bytes: u64,
}

/// Exponentially weighted transfer rate, in bytes per millisecond.
///
/// The blend weight grows with how far a new rate is from the current
/// estimate, so jitter is damped while a stalled or resumed connection shows
/// up almost immediately.
#[derive(Clone, Debug, Default)]
pub struct SpeedEstimator {
    estimate: f64,
    last: Option<ProgressSample>,
}

/// Weight given to a new rate for a relative change against the estimate.
pub fn blend_weight(relative_change: f64) -> f64 {
    if relative_change < 0.5 {
        0.05
    } else if relative_change < 0.7 {
        0.1
    } else if relative_change < 0.8 {
        0.2
    } else if relative_change < 0.9 {
        0.3
    } else if relative_change < 1.0 {
        0.5
    } else {
        1.0
    }
}

impl SpeedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the estimate and the previous sample (new transfer session).
    pub fn reset(&mut self) {
        self.estimate = 0.0;
        self.last = None;
    }

    /// Current estimate in bytes per millisecond (0 when unknown).
    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Record a progress sample.
    ///
    /// Returns the updated estimate when a rate could be derived from the
    /// previous sample. No rate is derived after a zero-byte sample, for a
    /// zero or negative time step, or when the byte count went backwards.
    pub fn observe(&mut self, sample: ProgressSample) -> Option<f64> {
        let prev = self.last.replace(sample)?;
        if prev.bytes == 0 || sample.bytes < prev.bytes {
            return None;
        }
        let elapsed = sample.at_ms - prev.at_ms;
        if elapsed <= 0.0 {
            return None;
        }
        let rate = (sample.bytes - prev.bytes) as f64 / elapsed;
        Some(self.blend(rate))
    }

    /// Take `sample` as the previous sample without deriving a rate.
    pub fn record(&mut self, sample: ProgressSample) {
        self.last = Some(sample);
    }

    /// Blend an instantaneous rate into the estimate and return the result.
    ///
    /// With no estimate yet the rate is taken as is.
    pub fn blend(&mut self, rate: f64) -> f64 {
        if self.estimate <= 0.0 {
            self.estimate = rate;
            return rate;
        }
        let relative_change = (rate - self.estimate).abs() / self.estimate;
        let weight = blend_weight(relative_change);
        self.estimate = weight * rate + (1.0 - weight) * self.estimate;
        self.estimate
    }

    /// Seconds needed for `remaining` bytes at the current estimate.
    ///
    /// Negative (unknown) when there is no usable estimate.
    pub fn eta_secs(&self, remaining: u64) -> f64 {
        if self.estimate <= 0.0 {
            return -1.0;
        }
        remaining as f64 / self.estimate / 1000.0
    }
}

/// Format a remaining duration as a compact clock (`[[h:]m:]s`).
///
/// - over a day: `more_than_a_day`
/// - negative or NaN: empty (unknown / done)
/// - under one second: `"1"`
///
/// Only units below the leading one are zero-padded.
pub fn format_seconds(secs: f64, more_than_a_day: &str) -> String {
    if secs > ONE_DAY_SECS {
        return more_than_a_day.to_string();
    }
    if secs.is_nan() || secs < 0.0 {
        return String::new();
    }
    if secs < 1.0 {
        return "1".to_string();
    }

    let total = secs.round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}:{:02}", minutes, seconds)
    } else {
        seconds.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "More than 1 day";

    fn sample(at_ms: f64, bytes: u64) -> ProgressSample {
        ProgressSample { at_ms, bytes }
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0, DAY), "1");
        assert_eq!(format_seconds(0.4, DAY), "1");
        assert_eq!(format_seconds(59.0, DAY), "59");
        assert_eq!(format_seconds(60.0, DAY), "1:00");
        assert_eq!(format_seconds(605.0, DAY), "10:05");
        assert_eq!(format_seconds(3661.0, DAY), "1:01:01");
        assert_eq!(format_seconds(90000.0, DAY), DAY);
        assert_eq!(format_seconds(f64::INFINITY, DAY), DAY);
        assert_eq!(format_seconds(-3.0, DAY), "");
        assert_eq!(format_seconds(f64::NAN, DAY), "");
    }

    #[test]
    fn test_format_seconds_rounds() {
        assert_eq!(format_seconds(59.6, DAY), "1:00");
        assert_eq!(format_seconds(86400.0, DAY), "24:00:00");
    }

    #[test]
    fn test_blend_weight_table() {
        assert_eq!(blend_weight(0.0), 0.05);
        assert_eq!(blend_weight(0.49), 0.05);
        assert_eq!(blend_weight(0.5), 0.1);
        assert_eq!(blend_weight(0.75), 0.2);
        assert_eq!(blend_weight(0.85), 0.3);
        assert_eq!(blend_weight(0.95), 0.5);
        assert_eq!(blend_weight(1.0), 1.0);
        assert_eq!(blend_weight(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_first_rate_seeds_estimate() {
        let mut speed = SpeedEstimator::new();
        assert_eq!(speed.blend(42.0), 42.0);
        assert_eq!(speed.estimate(), 42.0);
    }

    #[test]
    fn test_constant_rate_converges() {
        let mut speed = SpeedEstimator::new();
        let rate = 10u64;
        assert_eq!(speed.observe(sample(0.0, 100)), None);
        for step in 1..50u64 {
            speed.observe(sample(step as f64 * 100.0, 100 + step * 100 * rate));
        }
        assert!((speed.estimate() - rate as f64).abs() < 1e-9);
    }

    #[test]
    fn test_small_change_is_damped() {
        let mut speed = SpeedEstimator::new();
        speed.blend(100.0);
        let updated = speed.blend(140.0);
        assert!((updated - 102.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_change_moves_fast() {
        let mut speed = SpeedEstimator::new();
        speed.blend(100.0);
        // 0.8 relative change -> weight 0.3
        let updated = speed.blend(180.0);
        assert!((updated - 124.0).abs() < 1e-9);

        // Doubling is a relative change of exactly 1.0: full replacement.
        let mut speed = SpeedEstimator::new();
        speed.blend(100.0);
        assert_eq!(speed.blend(200.0), 200.0);
    }

    #[test]
    fn test_zero_estimate_reseeds() {
        let mut speed = SpeedEstimator::new();
        speed.blend(100.0);
        // A stall is a relative change of 1.0 and drops the estimate to 0.
        assert_eq!(speed.blend(0.0), 0.0);
        assert_eq!(speed.blend(30.0), 30.0);
    }

    #[test]
    fn test_observe_skips_unusable_steps() {
        let mut speed = SpeedEstimator::new();
        assert_eq!(speed.observe(sample(0.0, 0)), None);
        // Previous sample had zero bytes.
        assert_eq!(speed.observe(sample(10.0, 500)), None);
        // Same timestamp.
        assert_eq!(speed.observe(sample(10.0, 600)), None);
        assert_eq!(speed.observe(sample(20.0, 700)), Some(10.0));
        // Bytes went backwards.
        assert_eq!(speed.observe(sample(30.0, 100)), None);
    }

    #[test]
    fn test_eta() {
        let mut speed = SpeedEstimator::new();
        assert!(speed.eta_secs(1000) < 0.0);
        speed.blend(2.0);
        assert_eq!(speed.eta_secs(4000), 2.0);
        speed.reset();
        assert_eq!(speed.estimate(), 0.0);
    }
}
