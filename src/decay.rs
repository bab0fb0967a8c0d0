//! Timeout decay for repeated calls to the same logical endpoint.
//!
//! Each call for a cache key shrinks the next timeout by the configured
//! factor, floored at the factor itself. The sequence restarts once the
//! rolling window has elapsed since the key was last reset.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::{clock::now_ms, QueryParams};

/// Default per-call shrink increment.
pub const DEFAULT_DECAY_FACTOR: f64 = 0.3;

/// Rolling window after which a key's decay sequence restarts.
pub const RESET_INTERVAL_MS: u64 = 60_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DecayState {
    count: u32,
    last_reset_ms: u64,
}

/// Tracks per-key call counts and yields timeout multipliers in
/// `[decay_factor, 1.0]`.
#[derive(Debug)]
pub struct DecayTracker {
    decay_factor: f64,
    states: Mutex<HashMap<String, DecayState>>,
}

impl DecayTracker {
    /// Creates a tracker. Factors above `1.0` are clamped to `1.0`.
    pub fn new(decay_factor: f64) -> Self {
        Self {
            decay_factor: decay_factor.min(1.0),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a tracker only for a usable factor (finite and positive).
    pub fn from_config(decay_factor: Option<f64>) -> Option<Self> {
        decay_factor
            .filter(|factor| factor.is_finite() && *factor > 0.0)
            .map(Self::new)
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    /// Returns the multiplier for `key` and records the call.
    pub fn factor_for(&self, key: &str) -> f64 {
        self.factor_at(key, now_ms())
    }

    /// Same as [`DecayTracker::factor_for`] with an explicit clock reading.
    pub fn factor_at(&self, key: &str, now_ms: u64) -> f64 {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let state = states.entry(key.to_owned()).or_insert(DecayState {
            count: 0,
            last_reset_ms: now_ms,
        });

        if now_ms.saturating_sub(state.last_reset_ms) > RESET_INTERVAL_MS {
            *state = DecayState {
                count: 0,
                last_reset_ms: now_ms,
            };
        }

        let count = state.count;
        state.count = state.count.saturating_add(1);

        (1.0 - f64::from(count) * self.decay_factor).max(self.decay_factor)
    }
}

impl Default for DecayTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_FACTOR)
    }
}

/// Canonical key for a logical call: the absolute URL, plus the JSON form of
/// the parameters when any were supplied.
pub(crate) fn cache_key(absolute_url: &str, params: Option<&QueryParams>) -> String {
    match params.and_then(|params| serde_json::to_string(params).ok()) {
        Some(json) => format!("{absolute_url}?{json}"),
        None => absolute_url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{cache_key, DecayTracker, RESET_INTERVAL_MS};
    use crate::QueryParams;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn factors_shrink_and_floor_within_window() {
        let tracker = DecayTracker::new(0.3);
        let factors: Vec<f64> = (0..6)
            .map(|i| tracker.factor_at("/api/mint-info", 1_000 + i * 100))
            .collect();

        assert_close(factors[0], 1.0);
        assert_close(factors[1], 0.7);
        assert_close(factors[2], 0.4);
        assert_close(factors[3], 0.3);
        assert_close(factors[5], 0.3);
        assert!(factors.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn sequence_restarts_after_window() {
        let tracker = DecayTracker::new(0.3);
        assert_close(tracker.factor_at("k", 0), 1.0);
        assert_close(tracker.factor_at("k", 10), 0.7);
        assert_close(tracker.factor_at("k", RESET_INTERVAL_MS + 1), 1.0);
        assert_close(tracker.factor_at("k", RESET_INTERVAL_MS + 2), 0.7);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let tracker = DecayTracker::new(0.3);
        tracker.factor_at("k", 0);
        assert_close(tracker.factor_at("k", RESET_INTERVAL_MS), 0.7);
    }

    #[test]
    fn keys_are_tracked_independently() {
        let tracker = DecayTracker::new(0.5);
        assert_close(tracker.factor_at("a", 0), 1.0);
        assert_close(tracker.factor_at("a", 1), 0.5);
        assert_close(tracker.factor_at("b", 2), 1.0);
    }

    #[test]
    fn unusable_factors_disable_tracking() {
        assert!(DecayTracker::from_config(None).is_none());
        assert!(DecayTracker::from_config(Some(0.0)).is_none());
        assert!(DecayTracker::from_config(Some(f64::NAN)).is_none());
        let clamped = DecayTracker::from_config(Some(4.0)).expect("tracker");
        assert_close(clamped.decay_factor(), 1.0);
        assert_close(clamped.factor_at("k", 0), 1.0);
        assert_close(clamped.factor_at("k", 1), 1.0);
    }

    #[test]
    fn cache_key_includes_params_json() {
        assert_eq!(cache_key("https://x/api", None), "https://x/api");
        let params = QueryParams::new().with("address", "0xabc");
        assert_eq!(
            cache_key("https://x/api?address=0xabc", Some(&params)),
            r#"https://x/api?address=0xabc?{"address":"0xabc"}"#
        );
    }
}
