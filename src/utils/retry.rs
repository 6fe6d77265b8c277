use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Fixed Backoff Retry Strategy
// ============================================================================
//
// Bounded retry for a single unit of work. Each failed attempt is followed by
// the same fixed delay, except the last one: once `max_attempts` failures have
// been seen the error is handed back immediately.
//
// The delay is an async suspension point (tokio timer), so the caller's task
// yields instead of blocking its thread.
//
// ============================================================================

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Result<Self, RetryError> {
        if max_attempts == 0 {
            return Err(RetryError::ZeroAttempts);
        }
        Ok(Self { max_attempts, backoff })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// Result of a retried operation
#[derive(Debug, PartialEq)]
pub enum RetryResult<T, E> {
    /// An attempt succeeded; no further attempts were made
    Success { value: T, attempts: u32 },
    /// Every attempt failed; carries the last failure
    Exhausted { last_error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryResult::Success { attempts, .. } | RetryResult::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success { .. })
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// `operation` receives the attempt number, starting at 1.
pub async fn retry_with_backoff<F, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return RetryResult::Success { value, attempts: attempt };
            }
            Err(error) => {
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    error = %error,
                    "Processing failed. Retrying {}/{}",
                    attempt,
                    policy.max_attempts
                );

                if attempt >= policy.max_attempts {
                    return RetryResult::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }

                sleep(policy.backoff).await;
            }
        }
    }
}
