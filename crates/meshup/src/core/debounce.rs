//! Trailing-edge debouncing for resize and zoom events
//!
//! Time is passed in explicitly so callers drive the debouncer from their own
//! event loop clock.

use std::time::{Duration, Instant};

/// Keeps only the last value pushed and releases it once no new value has
/// arrived for a full window
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace the pending value and restart the window at `now`
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Take the pending value if its window has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if ready {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending value regardless of the window
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_released_after_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        debouncer.push(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(49)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_rapid_pushes_collapse_to_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        for i in 0..5u64 {
            debouncer.push(i, start + Duration::from_millis(i * 10));
        }
        // Window restarts on every push, so 50ms after the first is too early
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(90)), Some(4));
    }

    #[test]
    fn test_flush_ignores_window() {
        let mut debouncer = Debouncer::new(Duration::from_secs(10));
        debouncer.push("resize", Instant::now());
        assert_eq!(debouncer.flush(), Some("resize"));
        assert_eq!(debouncer.flush(), None);
    }
}
