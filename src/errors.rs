//! Error taxonomy for proxy construction and per-call execution.
//!
//! Construction problems surface as [`ConfigurationError`] from the factory and
//! never reach call time. Everything raised while a call is in flight is an
//! [`InvocationError`]; errors produced by the target or by advice travel inside
//! [`TargetInvocationError`] untouched so callers can downcast to the original.

use std::error::Error as StdError;
use std::fmt;

use crate::context::ContextError;

/// Result type for a single intercepted call.
pub type InvocationResult = std::result::Result<crate::invocation::ReturnValue, InvocationError>;

/// Boxed error payload carried through the chain.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Invalid strategy/target combination, detected while building a proxy.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Interface {interface} is not implemented by target type {target}")]
    InterfaceNotImplemented {
        interface: &'static str,
        target: &'static str,
    },

    #[error("Cannot create subclass proxy for sealed type {target}")]
    SealedTarget { target: &'static str },

    #[error("No advisors configured for {target} and empty advice chains are not allowed")]
    EmptyAdviceChain { target: &'static str },

    #[error("Cannot modify advice: configuration is frozen")]
    Frozen,

    #[error("Advisor index {index} out of range (have {len})")]
    AdvisorIndex { index: usize, len: usize },
}

/// Whatever the target or an advice raised, preserved for inspection.
///
/// The wrapper is transparent for `Display` and `source()`; use
/// [`downcast_ref`](Self::downcast_ref) or [`into_inner`](Self::into_inner) to
/// get back the original error.
pub struct TargetInvocationError {
    inner: BoxError,
}

impl TargetInvocationError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self { inner: err.into() }
    }

    /// Borrow the original error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Check whether the original error is of type `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    /// Consume the wrapper and return the original error.
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl fmt::Debug for TargetInvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for TargetInvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for TargetInvocationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Errors raised while a call travels through a proxy.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// Pass-through of an error raised by the target or by advice.
    #[error(transparent)]
    Raised(TargetInvocationError),

    #[error("No method `{method}` on {target}")]
    NoSuchMethod {
        target: &'static str,
        method: String,
    },

    #[error("Method `{method}` is not exposed by the interfaces proxied for {target}")]
    NotExposed {
        target: &'static str,
        method: String,
    },

    #[error("Missing argument {index} for `{method}`")]
    MissingArgument { method: &'static str, index: usize },

    #[error("Argument {index} for `{method}` is not a {expected}")]
    ArgumentType {
        method: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("Return value of `{method}` is not a {expected}")]
    ReturnType {
        method: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Context(#[from] ContextError),

    /// A proxy invariant was broken; not caused by the caller.
    #[error("Internal proxy error: {0}")]
    Internal(String),
}

impl InvocationError {
    /// Wrap an error raised by the target or by advice.
    pub fn raised(err: impl Into<BoxError>) -> Self {
        InvocationError::Raised(TargetInvocationError::new(err))
    }

    pub fn no_such_method(target: &'static str, method: impl Into<String>) -> Self {
        InvocationError::NoSuchMethod {
            target,
            method: method.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        InvocationError::Internal(message.into())
    }

    /// Borrow the original raised error as `E`, if this is a pass-through of one.
    pub fn raised_as<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            InvocationError::Raised(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}
