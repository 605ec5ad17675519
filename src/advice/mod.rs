//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides interceptors that add orthogonal behavior
//! (logging, counting, retries) without polluting core business logic.
//!
//! # Architecture
//!
//! Advice is applied at proxy construction time, not in implementations:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! let bean = TestBean::new("tony");
//!
//! // Apply advice through a proxy
//! let mut factory = ProxyFactory::new(bean);
//! factory.add_advice(LoggingInterceptor::new())?;
//! let bean = factory.get_proxy()?;
//!
//! // Use as normal - logging is transparent
//! bean.name()?;
//! ```
//!
//! # Available Advice
//!
//! - [`LoggingInterceptor`] - tracing events around every call
//! - [`CountingInterceptor`] - shared call counter
//! - [`RetryInterceptor`] - re-runs the rest of the chain on failure
//!
//! Narrower advice kinds ([`BeforeAdvice`], [`AfterReturningAdvice`],
//! [`ThrowsAdvice`]) are adapted into interceptors when chains are built.

mod adapters;
mod counting;
mod logging;
mod retry;

pub use adapters::{
    AfterReturningAdvice, AfterReturningAdviceInterceptor, BeforeAdvice, BeforeAdviceInterceptor,
    ThrowsAdvice, ThrowsAdviceInterceptor,
};
pub use counting::CountingInterceptor;
pub use logging::LoggingInterceptor;
pub use retry::{default_backoff, is_retryable, RetryInterceptor};
