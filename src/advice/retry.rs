//! Retry advice with exponential backoff.
//!
//! Calls `proceed()` again while the error is retryable and the backoff
//! still yields delays. Each retry re-runs the remainder of the chain and
//! the target.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use tracing::{debug, warn};

use crate::errors::{InvocationError, InvocationResult};
use crate::invocation::{MethodInterceptor, MethodInvocation};

type RetryPredicate = Arc<dyn Fn(&InvocationError) -> bool + Send + Sync>;

/// Standard backoff for retry advice.
///
/// - Min delay: 10ms
/// - Max delay: 2s
/// - Max attempts: 3
/// - Jitter enabled
pub fn default_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(3)
        .with_jitter()
}

/// Errors raised by the target or advice are retryable; engine errors
/// (unknown method, bad arguments, missing proxy) are not.
pub fn is_retryable(err: &InvocationError) -> bool {
    matches!(err, InvocationError::Raised(_))
}

/// Advice that retries the rest of the chain on retryable errors.
#[derive(Clone)]
pub struct RetryInterceptor {
    backoff: ExponentialBuilder,
    retryable: RetryPredicate,
}

impl RetryInterceptor {
    pub fn new(backoff: ExponentialBuilder) -> Self {
        Self {
            backoff,
            retryable: Arc::new(is_retryable),
        }
    }

    /// Only retry errors for which `predicate` returns true.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&InvocationError) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(predicate);
        self
    }
}

impl Default for RetryInterceptor {
    fn default() -> Self {
        Self::new(default_backoff())
    }
}

impl fmt::Debug for RetryInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryInterceptor")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl MethodInterceptor for RetryInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        let mut delays = self.backoff.clone().build();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match invocation.proceed() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(method = %invocation.method(), attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if (self.retryable)(&e) => match delays.next() {
                    Some(delay) => {
                        warn!(
                            method = %invocation.method(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying after failure"
                        );
                        std::thread::sleep(delay);
                    }
                    None => {
                        warn!(
                            method = %invocation.method(),
                            attempts = attempt,
                            error = %e,
                            "Giving up after retries"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "retry"
    }
}
