use std::time::Duration;

use tokio::time::Instant;

/// Lets an event through at most once every `every`
#[derive(Debug, Clone)]
pub struct Sampler {
    every: Duration,
    last: Option<Instant>,
}

impl Sampler {
    pub fn new(every: Duration) -> Self {
        Self { every, last: None }
    }

    /// Returns `true` if enough time has passed since the last sampled event
    pub fn sample(&mut self) -> bool {
        self.sample_at(Instant::now())
    }

    pub fn sample_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.every => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
