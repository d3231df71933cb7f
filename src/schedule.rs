use std::time::Duration;

/// Shortest time an iteration is given, and the fastest retry cadence
pub const MIN_TIMEOUT: Duration = Duration::from_millis(250);
/// Longest time an iteration is given, and the slowest retry cadence
pub const MAX_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Adaptive timeout of the renewal loop
///
/// The timeout bounds how long an iteration may take and, on failure, how
/// long the loop waits before the next one. It doubles after every failure,
/// up to `max`, and halves after every success, down to `min`:
///
/// ```plain
/// failure: T = min(2 * T, max)
/// success: T = max(T / 2, min)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    timeout: Duration,
    min: Duration,
    max: Duration,
}

impl Schedule {
    /// Creates a schedule bounded by `min` and `max`, starting from `min`
    ///
    /// # Panics
    ///
    /// If `min` is greater than `max`
    pub fn new(min: Duration, max: Duration) -> Self {
        assert!(min <= max, "minimum timeout {min:?} exceeds maximum {max:?}");
        Self {
            timeout: min,
            min,
            max,
        }
    }

    /// The timeout of the next iteration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn succeeded(&mut self) {
        self.timeout = (self.timeout / 2).max(self.min);
    }

    pub fn failed(&mut self) {
        self.timeout = self.timeout.saturating_mul(2).min(self.max);
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(MIN_TIMEOUT, MAX_TIMEOUT)
    }
}
