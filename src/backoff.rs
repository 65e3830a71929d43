//! Backoff strategies and the delay recurrence

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Backoff strategy for retries
///
/// The strategy maps the delay used before the current attempt to the delay
/// used before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Linear increase: next = current + initial_delay
    Linear,

    /// Exponential increase: next = current * 2
    Exponential,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::Exponential
    }
}

// Unrecognized strategy names fall back to exponential rather than failing
// deserialization. Out-of-range retry configuration is always corrected,
// never rejected.
impl<'de> Deserialize<'de> for BackoffStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "linear" => BackoffStrategy::Linear,
            _ => BackoffStrategy::Exponential,
        })
    }
}

impl BackoffStrategy {
    /// Compute the delay before the next attempt from the delay in effect
    /// before the current one. Pure and deterministic; the result never
    /// exceeds `max_delay`.
    pub fn next_delay(&self, current: Duration, initial_delay: Duration, max_delay: Duration) -> Duration {
        match self {
            BackoffStrategy::Linear => (current + initial_delay).min(max_delay),
            BackoffStrategy::Exponential => current.saturating_mul(2).min(max_delay),
        }
    }
}

/// Deterministic iterator over the waits a policy will perform between
/// attempts, starting at the initial delay and advanced by the recurrence.
/// Yields one item per retry the policy allows. Jitter is never included.
pub struct DelaySchedule {
    strategy: BackoffStrategy,
    initial_delay: Duration,
    max_delay: Duration,
    current: Duration,
    remaining: u32,
}

impl DelaySchedule {
    pub(crate) fn new(
        strategy: BackoffStrategy,
        initial_delay: Duration,
        max_delay: Duration,
        retries: u32,
    ) -> Self {
        Self {
            strategy,
            initial_delay,
            max_delay,
            current: initial_delay,
            remaining: retries,
        }
    }
}

impl Iterator for DelaySchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        let delay = self.current;
        self.current = self
            .strategy
            .next_delay(self.current, self.initial_delay, self.max_delay);
        self.remaining -= 1;
        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for DelaySchedule {}

/// Apply ±20% jitter to a delay
pub(crate) fn apply_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();

    let jitter_factor = rng.gen_range(0.8..1.2);
    Duration::from_nanos((delay.as_nanos() as f64 * jitter_factor) as u64)
}
