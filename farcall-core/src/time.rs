//! Time provider abstraction.
//!
//! Timed joins need sleep and timeout without binding the communicator to a
//! particular runtime. Code takes a [`TimeProvider`] where it needs time;
//! [`TokioTimeProvider`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during time operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The operation timed out.
    #[error("operation timed out")]
    Elapsed,
}

/// Provider trait for time operations.
///
/// `now()` is the provider's own monotonic clock; for the Tokio
/// implementation it is the time elapsed since provider creation. Absolute
/// deadlines are expressed on that clock.
#[async_trait(?Send)]
pub trait TimeProvider: Clone {
    /// Sleep for the specified duration.
    async fn sleep(&self, duration: Duration);

    /// Current time on the provider's clock.
    fn now(&self) -> Duration;

    /// Run a future with a timeout.
    ///
    /// Returns `Ok(result)` if the future completes within `duration`, or
    /// `Err(TimeError::Elapsed)` if the timeout expires first.
    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TimeError>
    where
        F: std::future::Future<Output = T>;
}

/// Wall-clock provider backed by Tokio's timer.
#[derive(Debug, Clone)]
pub struct TokioTimeProvider {
    /// Start instant for calculating elapsed time.
    start: std::time::Instant,
}

impl TokioTimeProvider {
    /// Create a new Tokio time provider.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for TokioTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl TimeProvider for TokioTimeProvider {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TimeError>
    where
        F: std::future::Future<Output = T>,
    {
        match tokio::time::timeout(duration, future).await {
            Ok(result) => Ok(result),
            Err(_) => Err(TimeError::Elapsed),
        }
    }
}
