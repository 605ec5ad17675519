//! Counting advice.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::InvocationResult;
use crate::invocation::{MethodInterceptor, MethodInvocation};

/// Counts calls entering this advice.
///
/// Clones share the same counter, so a clone can be kept for inspection
/// after the original has been handed to a factory.
#[derive(Debug, Clone, Default)]
pub struct CountingInterceptor {
    count: Arc<AtomicUsize>,
}

impl CountingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl MethodInterceptor for CountingInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        invocation.proceed()
    }

    fn name(&self) -> &str {
        "counting"
    }
}
