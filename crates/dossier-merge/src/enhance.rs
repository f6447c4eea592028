//! Optional enhancement of merged text by an external service.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dossier_core::{Error, Result};

/// External step that smooths merged text.
///
/// Implementations talk to whatever service they wrap. Failures are
/// reported as [`Error`]s; `Timeout` and `Network` errors are retried.
pub trait ContentEnhancer: Send + Sync {
    /// Return an improved version of `text` for `topic`.
    fn enhance<'a>(&'a self, topic: &'a str, text: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Retry budget for one enhancement.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, at least one.
    pub attempts: u32,
    /// Time limit per attempt.
    pub timeout: Duration,
    /// Delay before the first retry. Doubles after every failure.
    pub backoff: Duration,
}

/// What happened to the enhancement step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnhancementOutcome {
    /// Enhancement was not requested.
    #[default]
    Skipped,
    /// The enhancer's text replaced the merged text.
    Applied { attempts: u32 },
    /// Every attempt failed; the merged text was kept.
    FellBack { attempts: u32, error: String },
}

/// Run `enhancer` with timeout and exponential backoff.
///
/// Never fails: when every attempt errors (or a non-retryable error
/// occurs) the original text comes back with a `FellBack` outcome.
pub async fn enhance_with_retry(
    enhancer: &dyn ContentEnhancer,
    topic: &str,
    text: &str,
    policy: RetryPolicy,
) -> (String, EnhancementOutcome) {
    let attempts = policy.attempts.max(1);
    let mut delay = policy.backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let result = match tokio::time::timeout(policy.timeout, enhancer.enhance(topic, text)).await {
            Ok(Ok(enhanced)) if enhanced.trim().is_empty() => {
                Err(Error::content("enhancer returned empty text"))
            }
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: "enhance".to_string(),
                after: policy.timeout,
            }),
        };

        let err = match result {
            Ok(enhanced) => {
                info!(topic, attempt, "enhancement applied");
                return (enhanced, EnhancementOutcome::Applied { attempts: attempt });
            }
            Err(err) => err,
        };

        if !err.is_retryable() || attempt >= attempts {
            warn!(topic, attempt, error = %err, "enhancement failed, keeping merged text");
            return (
                text.to_string(),
                EnhancementOutcome::FellBack {
                    attempts: attempt,
                    error: err.to_string(),
                },
            );
        }

        warn!(
            topic,
            attempt,
            max = attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "enhancement failed, retrying"
        );
        tokio::time::sleep(delay).await;
        delay = delay.saturating_mul(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures::FutureExt;

    /// Fails with a network error `failures` times, then uppercases.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl ContentEnhancer for Flaky {
        fn enhance<'a>(&'a self, _topic: &'a str, text: &'a str) -> BoxFuture<'a, Result<String>> {
            async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                if call < self.failures {
                    Err(Error::Network {
                        message: "connection reset".into(),
                    })
                } else {
                    Ok(text.to_uppercase())
                }
            }
            .boxed()
        }
    }

    struct Rejecting;

    impl ContentEnhancer for Rejecting {
        fn enhance<'a>(&'a self, _topic: &'a str, _text: &'a str) -> BoxFuture<'a, Result<String>> {
            async { Err(Error::validation("bad input")) }.boxed()
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_then_applies() {
        let enhancer = Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let (text, outcome) = enhance_with_retry(&enhancer, "t", "merged", policy(3)).await;
        assert_eq!(text, "MERGED");
        assert_eq!(outcome, EnhancementOutcome::Applied { attempts: 3 });
    }

    #[tokio::test]
    async fn test_falls_back_after_exhaustion() {
        let enhancer = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        let (text, outcome) = enhance_with_retry(&enhancer, "t", "merged", policy(2)).await;
        assert_eq!(text, "merged");
        assert!(matches!(outcome, EnhancementOutcome::FellBack { attempts: 2, .. }));
        assert_eq!(enhancer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let (text, outcome) = enhance_with_retry(&Rejecting, "t", "merged", policy(3)).await;
        assert_eq!(text, "merged");
        assert!(matches!(outcome, EnhancementOutcome::FellBack { attempts: 1, .. }));
    }
}
