//! Ordered advice chains.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::advisor::Advisor;
use crate::errors::InvocationResult;
use crate::invocation::{Arguments, MethodInterceptor, MethodInvocation};
use crate::target::{Advisable, Method};

/// Immutable, ordered interceptors for one method.
///
/// Cloning shares the underlying sequence.
#[derive(Clone)]
pub struct AdviceChain {
    interceptors: Arc<[Arc<dyn MethodInterceptor>]>,
}

impl AdviceChain {
    pub fn new(interceptors: Vec<Arc<dyn MethodInterceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    /// Chain of the advisors that match `method`, in advisor order.
    pub fn for_method(advisors: &[Advisor], method: &Method) -> Self {
        Self::new(
            advisors
                .iter()
                .filter(|advisor| advisor.matches(method))
                .map(|advisor| advisor.advice().interceptor())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn interceptors(&self) -> &[Arc<dyn MethodInterceptor>] {
        &self.interceptors
    }

    /// Run `method` on `target` through this chain.
    ///
    /// An empty chain is a direct call. Errors from the target or any advice
    /// are returned as raised.
    pub fn invoke<T: Advisable>(
        &self,
        target: &T,
        method: &Method,
        args: Arguments,
    ) -> InvocationResult {
        self.invoke_with(None, target, type_name::<T>(), method, args)
    }

    pub(crate) fn invoke_with(
        &self,
        proxy_id: Option<Uuid>,
        target: &dyn Advisable,
        target_type: &'static str,
        method: &Method,
        args: Arguments,
    ) -> InvocationResult {
        let mut invocation = MethodInvocation::new(
            proxy_id,
            target,
            target_type,
            method,
            args,
            &self.interceptors,
        );
        invocation.proceed()
    }
}

impl Default for AdviceChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for AdviceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.interceptors.iter().map(|i| i.name()))
            .finish()
    }
}
