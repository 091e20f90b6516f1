//! Fixed-delay request throttle.
//!
//! The statistics endpoints publish no rate limit; a fixed pause before every
//! request keeps the polling rate at one request per `delay`.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// No pause at all.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Block the calling thread for the configured delay.
    pub fn wait(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    /// Lower bound on wall-clock time for `requests` throttled requests.
    /// Saturates at `Duration::MAX`.
    pub fn minimum_duration(&self, requests: usize) -> Duration {
        u32::try_from(requests)
            .ok()
            .and_then(|n| self.delay.checked_mul(n))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_millis(2000)
    }
}
