//! Proxies: the substitute objects callers use instead of targets.
//!
//! A [`Proxy`] carries the target, one advice chain per method, the strategy
//! that shapes its callable surface and a snapshot of the configuration it
//! was built with. Typed call surfaces are trait impls on `Proxy<T>` that
//! forward through [`Proxy::call`]:
//!
//! ```ignore
//! impl Greeter for Proxy<TestBean> {
//!     fn name(&self) -> Result<String, InvocationError> {
//!         self.call("name", args![])
//!     }
//! }
//! ```

mod interface;
mod strategy;
mod subclass;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use crate::advisor::Advisor;
use crate::chain::AdviceChain;
use crate::config::ProxyConfig;
use crate::context::ProxyContext;
use crate::errors::{InvocationError, InvocationResult};
use crate::invocation::Arguments;
use crate::target::{Advisable, InterfaceId, TargetDescriptor};

pub use interface::InterfaceProxy;
pub use strategy::{select as select_strategy, Dispatch, ProxyStrategy};
pub use subclass::{generated_type, generated_type_count, GeneratedType, SubclassProxy};

/// Shape of a proxy relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// Synthesized subtype of the target's concrete type.
    Subclass,
    /// Implements the target's interfaces by composition.
    Interface,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Subclass => f.write_str("subclass"),
            ProxyKind::Interface => f.write_str("interface"),
        }
    }
}

/// Runtime type a proxy presents.
#[derive(Debug, Clone)]
pub enum RuntimeType {
    Subclass(Arc<GeneratedType>),
    Interfaces(Arc<[InterfaceId]>),
}

impl RuntimeType {
    pub fn name(&self) -> String {
        match self {
            RuntimeType::Subclass(generated) => generated.name().to_string(),
            RuntimeType::Interfaces(interfaces) => {
                let names: Vec<&str> = interfaces.iter().map(|i| i.name()).collect();
                format!("Proxy<{}>", names.join(" + "))
            }
        }
    }

    pub fn is_subclass_of(&self, type_id: TypeId) -> bool {
        match self {
            RuntimeType::Subclass(generated) => generated.parent() == type_id,
            RuntimeType::Interfaces(_) => false,
        }
    }

    pub fn implements(&self, interface: &InterfaceId) -> bool {
        match self {
            RuntimeType::Subclass(generated) => generated.interfaces().contains(interface),
            RuntimeType::Interfaces(interfaces) => interfaces.contains(interface),
        }
    }
}

/// Kind, target class and exposure of a proxy. Visible even on opaque proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyInfo {
    pub kind: ProxyKind,
    pub target_class: TypeId,
    pub expose_proxy: bool,
}

/// Read-only view of a proxy's construction-time configuration.
pub trait Advised: Send + Sync {
    fn proxy_id(&self) -> Uuid;

    fn proxy_kind(&self) -> ProxyKind;

    fn config(&self) -> &ProxyConfig;

    fn is_proxy_target_class(&self) -> bool {
        self.config().proxy_target_class
    }

    fn is_expose_proxy(&self) -> bool {
        self.config().expose_proxy
    }

    fn is_frozen(&self) -> bool {
        self.config().frozen
    }

    fn target_class(&self) -> TypeId;

    fn target_class_name(&self) -> &'static str;

    fn proxied_interfaces(&self) -> Vec<InterfaceId>;

    fn advisors(&self) -> &[Advisor];

    fn runtime_type(&self) -> RuntimeType;
}

/// Uniform inspection of targets and proxies.
///
/// Every [`Advisable`] type and every [`Proxy`] implements this, so the
/// helpers in [`aop_utils`](crate::aop_utils) accept either.
pub trait ProxyIntrospect {
    fn proxy_info(&self) -> Option<ProxyInfo> {
        None
    }

    /// The `Advised` view, unless this is not a proxy or the proxy is opaque.
    fn as_advised(&self) -> Option<&dyn Advised> {
        None
    }
}

impl<T: Advisable> ProxyIntrospect for T {}

struct ProxyInner<T> {
    id: Uuid,
    target: Arc<T>,
    descriptor: TargetDescriptor,
    strategy: Box<dyn ProxyStrategy>,
    chains: HashMap<&'static str, AdviceChain>,
    advisors: Vec<Advisor>,
    config: ProxyConfig,
}

/// Substitute for a target of type `T`.
///
/// Cloning is cheap and keeps identity: clones compare equal under
/// [`Proxy::ptr_eq`] and share the same id.
pub struct Proxy<T: Advisable> {
    inner: Arc<ProxyInner<T>>,
}

impl<T: Advisable> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Advisable> Proxy<T> {
    pub(crate) fn new(
        target: Arc<T>,
        descriptor: TargetDescriptor,
        strategy: Box<dyn ProxyStrategy>,
        chains: HashMap<&'static str, AdviceChain>,
        advisors: Vec<Advisor>,
        config: ProxyConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ProxyInner {
                id: Uuid::new_v4(),
                target,
                descriptor,
                strategy,
                chains,
                advisors,
                config,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn kind(&self) -> ProxyKind {
        self.inner.strategy.kind()
    }

    /// Whether both handles refer to the same proxy.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this proxy is usable as a `U`: true for the target type of a
    /// subclass proxy, false otherwise.
    pub fn is_instance_of<U: 'static>(&self) -> bool {
        self.inner
            .strategy
            .runtime_type()
            .is_subclass_of(TypeId::of::<U>())
    }

    /// The raw target. Calls made on it bypass all advice.
    pub fn target(&self) -> &Arc<T> {
        &self.inner.target
    }

    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.inner.descriptor
    }

    /// The advice chain built for `method`, if the target declares it.
    pub fn chain_for(&self, method: &str) -> Option<&AdviceChain> {
        self.inner.chains.get(method)
    }

    /// Call `method` through this proxy.
    pub fn invoke(&self, method: &str, args: Arguments) -> InvocationResult {
        let inner = &*self.inner;
        let dispatch = inner.strategy.resolve(&inner.descriptor, method)?;

        // Final methods are never intercepted, so they never see the proxy.
        let exposes = inner.config.expose_proxy
            && !matches!(dispatch, Dispatch::Direct(resolved) if resolved.is_final());
        // Held until the call has fully unwound, on every exit path.
        let _exposed = exposes.then(|| ProxyContext::enter(self));

        match dispatch {
            Dispatch::Intercepted(resolved) => {
                let chain = inner.chains.get(resolved.name()).ok_or_else(|| {
                    InvocationError::internal(format!(
                        "no advice chain built for intercepted method {}::{}",
                        inner.descriptor.type_name(),
                        resolved.name()
                    ))
                })?;
                chain.invoke_with(
                    Some(inner.id),
                    &*inner.target,
                    inner.descriptor.type_name(),
                    resolved,
                    args,
                )
            }
            Dispatch::Direct(resolved) => {
                trace!(
                    proxy = %inner.id,
                    method = %resolved,
                    "Calling target directly"
                );
                inner.target.dispatch(resolved, &args)
            }
        }
    }

    /// Call `method` and take the result as `R`.
    pub fn call<R: Any>(&self, method: &str, args: Arguments) -> Result<R, InvocationError> {
        self.invoke(method, args)?.downcast::<R>(method)
    }
}

impl<T: Advisable> Advised for Proxy<T> {
    fn proxy_id(&self) -> Uuid {
        self.inner.id
    }

    fn proxy_kind(&self) -> ProxyKind {
        self.kind()
    }

    fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    fn target_class(&self) -> TypeId {
        self.inner.descriptor.type_id()
    }

    fn target_class_name(&self) -> &'static str {
        self.inner.descriptor.type_name()
    }

    fn proxied_interfaces(&self) -> Vec<InterfaceId> {
        match self.inner.strategy.runtime_type() {
            RuntimeType::Interfaces(interfaces) => interfaces.to_vec(),
            RuntimeType::Subclass(generated) => generated.interfaces().to_vec(),
        }
    }

    fn advisors(&self) -> &[Advisor] {
        &self.inner.advisors
    }

    fn runtime_type(&self) -> RuntimeType {
        self.inner.strategy.runtime_type()
    }
}

impl<T: Advisable> ProxyIntrospect for Proxy<T> {
    fn proxy_info(&self) -> Option<ProxyInfo> {
        Some(ProxyInfo {
            kind: self.kind(),
            target_class: self.inner.descriptor.type_id(),
            expose_proxy: self.inner.config.expose_proxy,
        })
    }

    fn as_advised(&self) -> Option<&dyn Advised> {
        if self.inner.config.opaque {
            None
        } else {
            Some(self)
        }
    }
}

impl<T: Advisable> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.inner.id)
            .field("kind", &self.kind())
            .field("runtime_type", &self.inner.strategy.runtime_type().name())
            .field("target", &self.inner.descriptor.type_name())
            .field("advisors", &self.inner.advisors.len())
            .finish()
    }
}
