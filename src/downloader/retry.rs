//! Flat-delay retry loop.
//!
//! An operation reports each attempt as an [`Attempt`]; the [`RetryPolicy`]
//! alone decides whether another attempt is made. Keeping the two apart lets
//! the policy be tested without any network.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::{MAX_ATTEMPTS, RETRY_DELAY};
use crate::utils::multierr::MultiError;

/// Result of a single attempt.
#[derive(Debug)]
pub enum Attempt<T, E> {
    Ok(T),
    /// Worth trying again while the budget lasts.
    Retryable(E),
    /// Retrying cannot help.
    Fatal(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    GiveUp,
    RetryAfter(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first.
    pub max_attempts: u32,
    /// Pause between attempts. Never grows.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// `attempt` is 1-based and names the attempt that just failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAfter(self.delay)
        }
    }
}

/// Every error seen before giving up, plus how many attempts were made.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub errors: MultiError<E>,
}

/// Runs `op` until it succeeds, fails fatally, or the policy gives up.
/// `op` receives the 1-based attempt number.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
    E: fmt::Display,
{
    let mut errors = MultiError::default();
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Attempt::Ok(value) => return Ok(value),
            Attempt::Fatal(err) => {
                errors.push(err);
                return Err(RetryExhausted {
                    attempts: attempt,
                    errors,
                });
            }
            Attempt::Retryable(err) => match policy.decide(attempt) {
                RetryDecision::GiveUp => {
                    errors.push(err);
                    return Err(RetryExhausted {
                        attempts: attempt,
                        errors,
                    });
                }
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %err,
                        "attempt failed, retrying in {:?}",
                        delay
                    );
                    errors.push(err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
