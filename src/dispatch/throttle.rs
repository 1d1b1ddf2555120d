use std::collections::HashMap;
use std::time::Duration;

/// Minimum interval between two accepted events of the same kind while
/// throttling is enabled.
pub const THROTTLE_WINDOW: Duration = Duration::from_millis(500);

/// Per-kind rate limiter.
///
/// Stores the timestamp (milliseconds) of the last *accepted* event of each
/// kind and the number of events dropped since then. Entries are created on
/// first sight, so the first event of a kind is always accepted. Only ever
/// touched from the dispatch thread.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_accepted_ms: HashMap<u32, u64>,
    suppressed: HashMap<u32, u32>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the event must be dropped. A drop bumps the
    /// pending suppressed count; an accept moves the window to `now_ms`.
    ///
    /// A timestamp earlier than the last accepted one counts as outside the
    /// window.
    pub fn should_suppress(&mut self, kind: u32, now_ms: u64) -> bool {
        let window_ms = THROTTLE_WINDOW.as_millis() as u64;
        if let Some(&last) = self.last_accepted_ms.get(&kind) {
            if let Some(diff) = now_ms.checked_sub(last) {
                if diff < window_ms {
                    *self.suppressed.entry(kind).or_insert(0) += 1;
                    return true;
                }
            }
        }
        self.last_accepted_ms.insert(kind, now_ms);
        false
    }

    /// Returns and clears the number of events of `kind` dropped since the
    /// last accepted one.
    pub fn take_suppressed(&mut self, kind: u32) -> u32 {
        self.suppressed.remove(&kind).unwrap_or(0)
    }

    /// Peeks at the pending suppressed count without clearing it.
    pub fn suppressed(&self, kind: u32) -> u32 {
        self.suppressed.get(&kind).copied().unwrap_or(0)
    }

    pub fn last_accepted_ms(&self, kind: u32) -> Option<u64> {
        self.last_accepted_ms.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIND_A: u32 = 0x0246;
    const KIND_B: u32 = 0x0247;

    #[test]
    fn first_event_is_accepted_even_at_time_zero() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.should_suppress(KIND_A, 0));
        assert_eq!(limiter.last_accepted_ms(KIND_A), Some(0));
    }

    #[test]
    fn drops_inside_window_and_accepts_at_boundary() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.should_suppress(KIND_A, 1_000));
        assert!(limiter.should_suppress(KIND_A, 1_499));
        assert!(!limiter.should_suppress(KIND_A, 1_500));
        assert_eq!(limiter.last_accepted_ms(KIND_A), Some(1_500));
    }

    #[test]
    fn suppressed_events_do_not_extend_the_window() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.should_suppress(KIND_A, 0));
        assert!(limiter.should_suppress(KIND_A, 300));
        assert!(limiter.should_suppress(KIND_A, 450));
        assert!(!limiter.should_suppress(KIND_A, 500));
    }

    #[test]
    fn counts_accumulate_and_reset_on_take() {
        let mut limiter = RateLimiter::new();
        limiter.should_suppress(KIND_A, 0);
        for t in [10, 20, 30] {
            assert!(limiter.should_suppress(KIND_A, t));
        }
        assert_eq!(limiter.suppressed(KIND_A), 3);
        assert_eq!(limiter.take_suppressed(KIND_A), 3);
        assert_eq!(limiter.take_suppressed(KIND_A), 0);
    }

    #[test]
    fn kinds_are_independent() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.should_suppress(KIND_A, 0));
        assert!(!limiter.should_suppress(KIND_B, 100));
        assert!(limiter.should_suppress(KIND_A, 200));
        assert_eq!(limiter.suppressed(KIND_B), 0);
        assert_eq!(limiter.suppressed(KIND_A), 1);
    }

    #[test]
    fn clock_going_backwards_is_accepted() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.should_suppress(KIND_A, 10_000));
        assert!(!limiter.should_suppress(KIND_A, 9_900));
        assert_eq!(limiter.last_accepted_ms(KIND_A), Some(9_900));
    }
}
