//! Logging advice.
//!
//! Emits a tracing event on entry and on exit of every intercepted call,
//! with elapsed time and outcome. Mirrors what a hand-written wrapper would
//! log, without touching the target.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::errors::InvocationResult;
use crate::invocation::{MethodInterceptor, MethodInvocation};

/// Wrapper advice that logs each call through the proxy.
///
/// Events are emitted at `debug` on entry and success and at `warn` on
/// failure. Fields:
/// - `target_type` - target type name
/// - `method` - method identity
/// - `proxy` - proxy id, when the call came through a proxy
/// - `elapsed_us` - time spent in the rest of the chain and the target
///
/// Clones share one call count.
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor {
    label: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every event with `label`, to tell several logging advisors apart.
    pub fn with_label(label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..Self::default()
        }
    }

    /// Number of calls this advice has logged.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MethodInterceptor for LoggingInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        let start = Instant::now();
        let target = invocation.target_type_name();
        let method = invocation.method().to_string();
        let proxy = invocation.proxy_id();
        self.calls.fetch_add(1, Ordering::Relaxed);

        debug!(
            label = self.label,
            target_type = target,
            method = %method,
            proxy = ?proxy,
            "Entering method"
        );

        let result = invocation.proceed();
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => debug!(
                label = self.label,
                target_type = target,
                method = %method,
                elapsed_us,
                "Method returned"
            ),
            Err(e) => warn!(
                label = self.label,
                target_type = target,
                method = %method,
                elapsed_us,
                error = %e,
                "Method failed"
            ),
        }

        result
    }

    fn name(&self) -> &str {
        self.label.unwrap_or("logging")
    }
}
