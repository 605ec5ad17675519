//! One in-flight call: arguments, return value and the chain cursor.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use crate::errors::{InvocationError, InvocationResult};
use crate::target::{Advisable, Method};

/// Ordered, type-erased call arguments.
#[derive(Default)]
pub struct Arguments {
    values: Vec<Box<dyn Any + Send>>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn with<A: Any + Send>(mut self, value: A) -> Self {
        self.values.push(Box::new(value));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow argument `index` as `A`.
    ///
    /// `method` only labels the error.
    pub fn get<A: Any>(&self, method: &Method, index: usize) -> Result<&A, InvocationError> {
        let value = self
            .values
            .get(index)
            .ok_or(InvocationError::MissingArgument {
                method: method.name(),
                index,
            })?;
        value
            .downcast_ref::<A>()
            .ok_or(InvocationError::ArgumentType {
                method: method.name(),
                index,
                expected: type_name::<A>(),
            })
    }

    /// Replace argument `index`. Returns `false` if there is no such argument.
    pub fn set<A: Any + Send>(&mut self, index: usize, value: A) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = Box::new(value);
                true
            }
            None => false,
        }
    }

    pub fn get_mut<A: Any>(&mut self, index: usize) -> Option<&mut A> {
        self.values.get_mut(index)?.downcast_mut::<A>()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Build [`Arguments`] from a list of expressions.
///
/// ```ignore
/// proxy.invoke("set_name", args!["tony".to_string()])?;
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::invocation::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::invocation::Arguments::new()$(.with($value))+
    };
}

/// Type-erased value returned by a target method or advice.
pub struct ReturnValue(Box<dyn Any + Send>);

impl ReturnValue {
    pub fn new<R: Any + Send>(value: R) -> Self {
        Self(Box::new(value))
    }

    /// The value of a method returning nothing.
    pub fn unit() -> Self {
        Self::new(())
    }

    pub fn is<R: Any>(&self) -> bool {
        self.0.is::<R>()
    }

    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.0.downcast_ref::<R>()
    }

    /// Take the value out as `R`. `method` only labels the error.
    pub fn downcast<R: Any>(self, method: &str) -> Result<R, InvocationError> {
        self.0
            .downcast::<R>()
            .map(|boxed| *boxed)
            .map_err(|_| InvocationError::ReturnType {
                method: method.to_string(),
                expected: type_name::<R>(),
            })
    }
}

impl fmt::Debug for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReturnValue(..)")
    }
}

/// Around advice: the unit every chain is built from.
///
/// An interceptor decides whether and how often to continue the call by
/// calling [`MethodInvocation::proceed`]. Code before `proceed` runs on the way
/// in, code after it on the way out. Not calling it short-circuits the rest of
/// the chain and the target.
pub trait MethodInterceptor: Send + Sync {
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult;

    /// Label used in logs.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Interceptor backed by a closure. See [`interceptor_fn`].
pub struct FnInterceptor<F> {
    name: &'static str,
    f: F,
}

impl<F> MethodInterceptor for FnInterceptor<F>
where
    F: Fn(&mut MethodInvocation<'_>) -> InvocationResult + Send + Sync,
{
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> InvocationResult {
        (self.f)(invocation)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Turn a closure into a named interceptor.
pub fn interceptor_fn<F>(name: &'static str, f: F) -> FnInterceptor<F>
where
    F: Fn(&mut MethodInvocation<'_>) -> InvocationResult + Send + Sync,
{
    FnInterceptor { name, f }
}

/// Cursor over an advice chain for a single call.
pub struct MethodInvocation<'a> {
    proxy_id: Option<Uuid>,
    target: &'a dyn Advisable,
    target_type: &'static str,
    method: &'a Method,
    arguments: Arguments,
    interceptors: &'a [Arc<dyn MethodInterceptor>],
    index: usize,
    attributes: HashMap<String, Box<dyn Any + Send>>,
}

impl<'a> MethodInvocation<'a> {
    pub(crate) fn new(
        proxy_id: Option<Uuid>,
        target: &'a dyn Advisable,
        target_type: &'static str,
        method: &'a Method,
        arguments: Arguments,
        interceptors: &'a [Arc<dyn MethodInterceptor>],
    ) -> Self {
        Self {
            proxy_id,
            target,
            target_type,
            method,
            arguments,
            interceptors,
            index: 0,
            attributes: HashMap::new(),
        }
    }

    /// Continue with the next interceptor, or the target once all have run.
    ///
    /// The position is restored when the callee returns, so calling this again
    /// from the same interceptor runs the remainder of the chain again.
    pub fn proceed(&mut self) -> InvocationResult {
        let interceptors = self.interceptors;
        let position = self.index;

        let Some(interceptor) = interceptors.get(position) else {
            trace!(method = %self.method, target_type = self.target_type, "Invoking target");
            return self.target.dispatch(self.method, &self.arguments);
        };

        trace!(
            method = %self.method,
            position,
            interceptor = interceptor.name(),
            "Entering interceptor"
        );
        self.index = position + 1;
        let result = interceptor.invoke(self);
        self.index = position;
        result
    }

    pub fn method(&self) -> &Method {
        self.method
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.arguments
    }

    /// Type name of the target behind the proxy.
    pub fn target_type_name(&self) -> &'static str {
        self.target_type
    }

    /// Id of the proxy handling this call, if the call came through one.
    pub fn proxy_id(&self) -> Option<Uuid> {
        self.proxy_id
    }

    /// Number of interceptors entered so far on the current descent.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn chain_len(&self) -> usize {
        self.interceptors.len()
    }

    /// Attach a value for later interceptors in this call.
    pub fn set_attribute<V: Any + Send>(&mut self, key: impl Into<String>, value: V) {
        self.attributes.insert(key.into(), Box::new(value));
    }

    pub fn attribute<V: Any>(&self, key: &str) -> Option<&V> {
        self.attributes.get(key)?.downcast_ref::<V>()
    }
}

impl fmt::Debug for MethodInvocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInvocation")
            .field("proxy_id", &self.proxy_id)
            .field("target", &self.target_type)
            .field("method", &self.method)
            .field("index", &self.index)
            .field("chain_len", &self.interceptors.len())
            .finish()
    }
}
