//! Request timing.

use std::time::{Duration, Instant};

/// Timing context for observability.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext {
    start: Instant,
}

impl TimingContext {
    /// Start timing now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed milliseconds since start.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_monotonic() {
        let timing = TimingContext::new();
        let first = timing.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timing.elapsed() > first);
        assert!(timing.elapsed_ms() >= 2);
    }
}
