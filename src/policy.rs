//! Retry policy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backoff::{BackoffStrategy, DelaySchedule};

/// Retry policy configuration
///
/// Immutable resilience parameters for one executor. Every field is optional
/// in serialized form and takes its default when omitted; out-of-range values
/// are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Cap on any computed delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Backoff strategy
    pub backoff_strategy: BackoffStrategy,

    /// Whether to add ±20% jitter to retry delays
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
            backoff_strategy: BackoffStrategy::Exponential,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Create a conservative retry policy for critical operations
    pub fn conservative() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            backoff_strategy: BackoffStrategy::Exponential,
            jitter: true,
        }
    }

    /// Create an aggressive retry policy for fast operations
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            backoff_strategy: BackoffStrategy::Exponential,
            jitter: true,
        }
    }

    /// Create a linear retry policy
    pub fn linear(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay * max_attempts.max(1),
            backoff_strategy: BackoffStrategy::Linear,
            jitter: false,
        }
    }

    /// Return a copy with the configuration invariants enforced:
    /// at least one attempt, and `initial_delay <= max_delay`.
    pub fn normalized(&self) -> Self {
        Self {
            max_attempts: self.max_attempts.max(1),
            initial_delay: self.initial_delay.min(self.max_delay),
            ..self.clone()
        }
    }

    /// Compute the delay before the next attempt from the delay used before
    /// the current one
    pub fn next_delay(&self, current: Duration) -> Duration {
        self.backoff_strategy
            .next_delay(current, self.initial_delay, self.max_delay)
    }

    /// The deterministic wait schedule this policy produces, one entry per
    /// retry it allows (jitter not included)
    pub fn delays(&self) -> DelaySchedule {
        let policy = self.normalized();
        DelaySchedule::new(
            policy.backoff_strategy,
            policy.initial_delay,
            policy.max_delay,
            policy.max_attempts - 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_millis(5000));
        assert_eq!(policy.backoff_strategy, BackoffStrategy::Exponential);
        assert!(!policy.jitter);
    }

    #[test]
    fn test_normalized_clamps_zero_attempts() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(policy.normalized().max_attempts, 1);
    }

    #[test]
    fn test_normalized_clamps_initial_delay_to_max() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        let normalized = policy.normalized();
        assert_eq!(normalized.initial_delay, Duration::from_secs(1));
        assert_eq!(normalized.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_normalized_is_identity_for_valid_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.normalized(), policy);
    }

    #[test]
    fn test_default_delay_schedule() {
        let delays: Vec<Duration> = RetryPolicy::default().delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn test_single_attempt_schedule_is_empty() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(policy.delays().count(), 0);
    }

    #[test]
    fn test_linear_preset() {
        let policy = RetryPolicy::linear(4, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.backoff_strategy, BackoffStrategy::Linear);

        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_millis(750),
            ]
        );
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, RetryPolicy::default());

        let policy: RetryPolicy = serde_json::from_str(
            r#"{"max_attempts": 5, "initial_delay": "250ms", "backoff_strategy": "linear"}"#,
        )
        .unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_millis(5000));
        assert_eq!(policy.backoff_strategy, BackoffStrategy::Linear);
    }

    #[test]
    fn test_deserialize_unknown_strategy_falls_back() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"backoff_strategy": "decorrelated"}"#).unwrap();
        assert_eq!(policy.backoff_strategy, BackoffStrategy::Exponential);
    }

    #[test]
    fn test_serde_round_trip() {
        let policy = RetryPolicy {
            max_attempts: 7,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            backoff_strategy: BackoffStrategy::Linear,
            jitter: true,
        };

        let json = serde_json::to_string(&policy).unwrap();
        let parsed: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
