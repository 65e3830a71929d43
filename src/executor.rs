//! Retry executor

use log::{debug, info, warn};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::backoff::apply_jitter;
use crate::policy::RetryPolicy;

/// Per-call attempt state. One instance exists per `execute` call and is
/// never shared; concurrent calls do not observe each other's counters or
/// delays.
struct AttemptState {
    /// 1-based count of attempts made so far
    attempt: u32,

    /// The wait to perform before the next retry
    current_delay: Duration,
}

impl AttemptState {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            current_delay: policy.initial_delay,
        }
    }

    fn advance(&mut self, next_delay: Duration) {
        self.current_delay = next_delay;
        self.attempt += 1;
    }
}

/// Retry executor
///
/// Drives a caller-supplied async operation under a [`RetryPolicy`] until it
/// succeeds or attempts are exhausted. The contract is strictly one result or
/// one error: the final failure is returned exactly as the operation produced
/// it, never wrapped.
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    ///
    /// The policy's configuration invariants are enforced here, so an
    /// out-of-range policy is corrected rather than rejected.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy: policy.normalized(),
        }
    }

    /// Create with default policy
    pub fn with_default_policy() -> Self {
        Self::new(RetryPolicy::default())
    }

    /// The (normalized) policy this executor applies
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_with_observer(f, |_attempt, _error: &E| std::future::ready(Ok(())))
            .await
    }

    /// Execute an operation with retry logic and an inter-attempt observer
    ///
    /// `on_retry` is invoked with the attempt number and the failure before
    /// each wait, and is awaited before the wait begins. It is never invoked
    /// after the final allowed attempt. An error returned by the observer is
    /// surfaced immediately and aborts further retries.
    pub async fn execute_with_observer<F, Fut, O, OFut, T, E>(
        &self,
        mut f: F,
        mut on_retry: O,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: FnMut(u32, &E) -> OFut,
        OFut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let mut state = AttemptState::new(&self.policy);

        loop {
            debug!(
                "Executing attempt {} of {}",
                state.attempt, self.policy.max_attempts
            );

            match f().await {
                Ok(result) => {
                    if state.attempt > 1 {
                        info!("Operation succeeded after {} attempts", state.attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if state.attempt >= self.policy.max_attempts {
                        warn!("Operation failed after {} attempts: {}", state.attempt, error);
                        return Err(error);
                    }

                    if let Err(abort) = on_retry(state.attempt, &error).await {
                        warn!(
                            "Retry observer aborted after attempt {}: {}",
                            state.attempt, abort
                        );
                        return Err(abort);
                    }

                    // The wait uses the delay in effect before this attempt;
                    // the recomputed value governs the following wait.
                    let next_delay = self.policy.next_delay(state.current_delay);
                    let wait = if self.policy.jitter {
                        apply_jitter(state.current_delay)
                    } else {
                        state.current_delay
                    };

                    warn!(
                        "Attempt {} failed: {}. Retrying in {:?}",
                        state.attempt, error, wait
                    );
                    sleep(wait).await;

                    state.advance(next_delay);
                }
            }
        }
    }
}
