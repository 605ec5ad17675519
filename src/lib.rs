//! aop-proxy - runtime method interception
//!
//! Wraps target objects in proxies that route each method call through an
//! ordered chain of advice before (and optionally instead of) reaching the
//! target. Proxies are built by a [`ProxyFactory`] from an advisor list and a
//! [`ProxyConfig`], and come in two shapes: interface proxies exposing only
//! the target's interfaces, and subclass proxies standing in for the
//! target's concrete type.
//!
//! ```ignore
//! let mut factory = ProxyFactory::with_config(bean, ProxyConfig::class_proxy().with_expose_proxy(true));
//! factory.add_advice(LoggingInterceptor::new())?;
//! let proxy = factory.get_proxy()?;
//! let name: String = proxy.call("get_name", args![])?;
//! ```

pub mod advice;
pub mod advisor;
pub mod aop_utils;
pub mod chain;
pub mod config;
pub mod context;
pub mod errors;
pub mod factory;
pub mod invocation;
pub mod proxy;
pub mod target;
pub mod utils;

pub use advice::{CountingInterceptor, LoggingInterceptor, RetryInterceptor};
pub use advisor::{Advice, Advisor, Pointcut};
pub use chain::AdviceChain;
pub use config::{Config, ProxyConfig};
pub use context::{current_proxy, ContextError, ProxyContext};
pub use errors::{ConfigurationError, InvocationError, InvocationResult, TargetInvocationError};
pub use factory::{AdvicePlan, ProxyFactory};
pub use invocation::{
    interceptor_fn, Arguments, MethodInterceptor, MethodInvocation, ReturnValue,
};
pub use proxy::{Advised, Proxy, ProxyInfo, ProxyIntrospect, ProxyKind, RuntimeType};
pub use target::{Advisable, InterfaceId, Method, TargetDescriptor};
