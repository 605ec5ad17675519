//! Before / after-returning / after-throwing advice and their interceptors.
//!
//! These narrower advice kinds cannot control the call. They are adapted
//! into around-style interceptors when a chain is built.

use std::sync::Arc;

use crate::errors::{InvocationError, InvocationResult};
use crate::invocation::{Arguments, MethodInterceptor, MethodInvocation, ReturnValue};
use crate::target::Method;

/// Runs before the rest of the chain. Returning an error aborts the call.
pub trait BeforeAdvice: Send + Sync {
    fn before(&self, method: &Method, args: &Arguments) -> Result<(), InvocationError>;
}

/// Runs after a successful call. Returning an error replaces the result.
pub trait AfterReturningAdvice: Send + Sync {
    fn after_returning(
        &self,
        value: &ReturnValue,
        method: &Method,
        args: &Arguments,
    ) -> Result<(), InvocationError>;
}

/// Observes a failed call. The original error still propagates.
pub trait ThrowsAdvice: Send + Sync {
    fn after_throwing(&self, method: &Method, args: &Arguments, error: &InvocationError);
}

pub struct BeforeAdviceInterceptor {
    advice: Arc<dyn BeforeAdvice>,
}

impl BeforeAdviceInterceptor {
    pub fn new(advice: Arc<dyn BeforeAdvice>) -> Self {
        Self { advice }
    }
}

impl MethodInterceptor for BeforeAdviceInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        self.advice
            .before(invocation.method(), invocation.arguments())?;
        invocation.proceed()
    }

    fn name(&self) -> &str {
        "before"
    }
}

pub struct AfterReturningAdviceInterceptor {
    advice: Arc<dyn AfterReturningAdvice>,
}

impl AfterReturningAdviceInterceptor {
    pub fn new(advice: Arc<dyn AfterReturningAdvice>) -> Self {
        Self { advice }
    }
}

impl MethodInterceptor for AfterReturningAdviceInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        let value = invocation.proceed()?;
        self.advice
            .after_returning(&value, invocation.method(), invocation.arguments())?;
        Ok(value)
    }

    fn name(&self) -> &str {
        "after_returning"
    }
}

pub struct ThrowsAdviceInterceptor {
    advice: Arc<dyn ThrowsAdvice>,
}

impl ThrowsAdviceInterceptor {
    pub fn new(advice: Arc<dyn ThrowsAdvice>) -> Self {
        Self { advice }
    }
}

impl MethodInterceptor for ThrowsAdviceInterceptor {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        invocation.proceed().inspect_err(|err| {
            self.advice
                .after_throwing(invocation.method(), invocation.arguments(), err)
        })
    }

    fn name(&self) -> &str {
        "after_throwing"
    }
}
