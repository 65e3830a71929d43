//! Retry with configurable backoff for async operations
//!
//! This crate provides a validated retry policy and an executor that drives
//! a caller-supplied async operation under it: linear or exponential backoff
//! with a delay cap, an optional inter-attempt observer, and opt-in jitter.
//!
//! The executor's contract is strictly one result or one error. The final
//! failure is surfaced exactly as the operation produced it, so callers can
//! branch on their own error types.
//!
//! ```no_run
//! use steadfast::{RetryExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn fetch() -> Result<String, std::io::Error> { Ok(String::new()) }
//! # async fn example() -> Result<(), std::io::Error> {
//! let executor = RetryExecutor::new(RetryPolicy {
//!     max_attempts: 5,
//!     initial_delay: Duration::from_millis(50),
//!     ..Default::default()
//! });
//!
//! let value = executor.execute(|| fetch()).await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod executor;
pub mod policy;

// Re-export commonly used types
pub use backoff::{BackoffStrategy, DelaySchedule};
pub use executor::RetryExecutor;
pub use policy::RetryPolicy;
