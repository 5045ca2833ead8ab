//! Retry policy for delivery attempts.

use std::time::Duration;
use vasatey_common::models::DeliveryErrorKind;
use vasatey_config::DispatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay: Duration },
    Abort,
}

/// Decides, after a failed attempt, whether to try again and how long to wait.
///
/// Delays grow linearly: attempt `n` failing is followed by `base × n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    retry_rate_limited_once: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, retry_rate_limited_once: bool) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retry_rate_limited_once,
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_base_ms),
            config.retry_rate_limited_once,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// `attempt` is the 1-based number of the attempt that just failed;
    /// `rate_limited_retries` counts the retries already granted after a
    /// rate-limit response in this dispatch.
    pub fn decide(
        &self,
        kind: DeliveryErrorKind,
        attempt: u32,
        rate_limited_retries: u32,
    ) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::Abort;
        }

        let retry = match kind {
            DeliveryErrorKind::InvalidToken | DeliveryErrorKind::ExpiredToken => false,
            DeliveryErrorKind::RateLimited => {
                self.retry_rate_limited_once && rate_limited_retries == 0
            }
            DeliveryErrorKind::Transient
            | DeliveryErrorKind::Unknown
            | DeliveryErrorKind::InvalidArgument => true,
        };

        if retry {
            RetryDecision::Retry {
                delay: self.delay_for(attempt),
            }
        } else {
            RetryDecision::Abort
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1000), false)
    }

    #[test]
    fn test_token_failures_never_retry() {
        for kind in [DeliveryErrorKind::InvalidToken, DeliveryErrorKind::ExpiredToken] {
            assert_eq!(policy().decide(kind, 1, 0), RetryDecision::Abort);
        }
    }

    #[test]
    fn test_transient_retries_until_budget() {
        let policy = policy();
        assert_eq!(
            policy.decide(DeliveryErrorKind::Transient, 1, 0),
            RetryDecision::Retry {
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(
            policy.decide(DeliveryErrorKind::Unknown, 2, 0),
            RetryDecision::Retry {
                delay: Duration::from_millis(2000)
            }
        );
        assert_eq!(
            policy.decide(DeliveryErrorKind::Transient, 3, 0),
            RetryDecision::Abort
        );
    }

    #[test]
    fn test_rate_limited_is_terminal_by_default() {
        assert_eq!(
            policy().decide(DeliveryErrorKind::RateLimited, 1, 0),
            RetryDecision::Abort
        );
    }

    #[test]
    fn test_rate_limited_retried_once_when_enabled() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500), true);
        assert_eq!(
            policy.decide(DeliveryErrorKind::RateLimited, 1, 0),
            RetryDecision::Retry {
                delay: Duration::from_millis(500)
            }
        );
        assert_eq!(
            policy.decide(DeliveryErrorKind::RateLimited, 2, 1),
            RetryDecision::Abort
        );
    }

    #[test]
    fn test_zero_budget_means_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), false);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.decide(DeliveryErrorKind::Transient, 1, 0),
            RetryDecision::Abort
        );
    }

    proptest! {
        #[test]
        fn test_delay_is_linear_and_non_decreasing(base_ms in 0u64..10_000, attempt in 1u32..50) {
            let policy = RetryPolicy::new(100, Duration::from_millis(base_ms), false);
            let current = policy.delay_for(attempt);
            let next = policy.delay_for(attempt + 1);

            prop_assert_eq!(current, Duration::from_millis(base_ms * u64::from(attempt)));
            prop_assert!(next >= current);
        }

        #[test]
        fn test_never_retries_past_budget(max in 1u32..10, attempt in 1u32..20) {
            let policy = RetryPolicy::new(max, Duration::from_millis(1), true);
            let decision = policy.decide(DeliveryErrorKind::Transient, attempt, 0);
            if attempt >= max {
                prop_assert_eq!(decision, RetryDecision::Abort);
            } else {
                prop_assert!(
                    matches!(decision, RetryDecision::Retry { delay: _ }),
                    "expected a retry before the budget is spent"
                );
            }
        }
    }
}
