//! Bounded retries for flaky remote calls
//!
//! Every remote read or write goes through one [`RetryPolicy`]. Errors are not
//! classified: any failure is retried until the attempts run out, and then the
//! last error is handed back unchanged.

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backoff {
    /// Wait `step * n` before the n-th retry.
    Linear {
        #[serde(with = "millis")]
        step: Duration,
    },
    /// Wait `initial * multiplier^(n-1)` before the n-th retry, capped at `max`.
    Exponential {
        #[serde(with = "millis")]
        initial: Duration,
        multiplier: f64,
        #[serde(with = "millis")]
        max: Duration,
    },
}

/// Retry configuration shared by all remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Backoff::Linear {
                step: Duration::from_millis(500),
            },
        }
    }
}

impl RetryPolicy {
    pub fn linear(attempts: u32, step: Duration) -> Self {
        Self {
            attempts,
            backoff: Backoff::Linear { step },
        }
    }

    pub fn exponential(attempts: u32, initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            attempts,
            backoff: Backoff::Exponential {
                initial,
                multiplier,
                max,
            },
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Linear { step } => step.saturating_mul(retry),
            Backoff::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
                let scaled = initial.as_nanos() as f64 * multiplier.powi(exponent);
                if scaled.is_finite() && scaled < max.as_nanos() as f64 {
                    Duration::from_nanos(scaled.max(0.0) as u64)
                } else {
                    max
                }
            }
        }
    }

    /// Run `operation` until it succeeds or the attempts are exhausted.
    ///
    /// `what` names the operation in the retry warnings.
    pub fn run<T, E, F>(&self, what: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let schedule = Schedule {
            policy: *self,
            retries: 0,
        };

        let result = backoff::retry_notify(
            schedule,
            || operation().map_err(backoff::Error::transient),
            |err: E, delay: Duration| {
                tracing::warn!(
                    operation = what,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Remote call failed, retrying"
                );
            },
        );

        match result {
            Ok(value) => Ok(value),
            Err(backoff::Error::Permanent(err)) | Err(backoff::Error::Transient { err, .. }) => {
                Err(err)
            }
        }
    }
}

/// Adapter feeding a [`RetryPolicy`] into the `backoff` retry loop.
struct Schedule {
    policy: RetryPolicy,
    retries: u32,
}

impl backoff::backoff::Backoff for Schedule {
    fn reset(&mut self) {
        self.retries = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries + 1 >= self.policy.attempts.max(1) {
            return None;
        }
        self.retries += 1;
        Some(self.policy.delay_for(self.retries))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
