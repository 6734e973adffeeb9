//! Bounded convergence polling.
//!
//! Both account creation and jump pod termination are asynchronous on the
//! provider side. [`await_completion`] re-issues a check until it reports a
//! terminal value, the check fails, or the overall deadline expires.
//!
//! # Example
//!
//! ```ignore
//! use poolctl_common::poll::{await_completion, PollConfig};
//!
//! let status = await_completion(
//!     &PollConfig::with_backoff(Duration::from_secs(1), Duration::from_secs(15), Duration::from_secs(600)),
//!     "account creation",
//!     || async {
//!         let status = provider.create_account_status(&request_id).await?;
//!         Ok(status.is_complete().then_some(status))
//!     },
//! ).await?;
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Error, Result};

/// Result type for polling check functions.
///
/// - `Ok(Some(value))` - Condition met, return the value
/// - `Ok(None)` - Condition not met yet, keep polling
/// - `Err(e)` - Fatal error, stop polling immediately
pub type PollResult<T> = Result<Option<T>>;

/// Interval and deadline for a convergence poll.
#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    /// Delay after the first unsuccessful check
    pub interval: Duration,
    /// Upper bound for the delay between checks
    pub max_interval: Duration,
    /// Multiplier applied to the delay after each check (1.0 = fixed interval)
    pub backoff_multiplier: f64,
    /// Overall deadline
    pub timeout: Duration,
}

impl PollConfig {
    /// Poll at a fixed interval until `timeout`
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            backoff_multiplier: 1.0,
            timeout,
        }
    }

    /// Poll with exponential backoff starting at `initial` and capped at `max`
    pub fn with_backoff(initial: Duration, max: Duration, timeout: Duration) -> Self {
        Self {
            interval: initial,
            max_interval: max,
            backoff_multiplier: 2.0,
            timeout,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.backoff_multiplier).min(self.max_interval.as_secs_f64()),
        )
    }
}

/// Poll `check` until it yields a value.
///
/// The first check runs immediately. Check errors are returned unchanged so
/// callers can classify them; an expired deadline returns [`Error::Timeout`]
/// naming `awaiting`.
pub async fn await_completion<T, F, Fut>(
    config: &PollConfig,
    awaiting: &str,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollResult<T>>,
{
    let start = Instant::now();
    let mut delay = config.interval;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        if let Some(value) = check().await? {
            debug!(awaiting = %awaiting, attempt, "Condition met");
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(Error::Timeout {
                awaiting: awaiting.to_string(),
                timeout: config.timeout,
            });
        }

        let sleep_for = delay.min(config.timeout - elapsed);
        debug!(
            awaiting = %awaiting,
            attempt,
            delay_ms = sleep_for.as_millis(),
            "Condition not met, polling again"
        );
        tokio::time::sleep(sleep_for).await;
        delay = config.next_delay(delay);
    }
}
