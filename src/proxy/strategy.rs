//! Proxy strategy selection.

use std::collections::HashMap;

use tracing::debug;

use super::interface::InterfaceProxy;
use super::subclass::SubclassProxy;
use super::{ProxyKind, RuntimeType};
use crate::chain::AdviceChain;
use crate::config::ProxyConfig;
use crate::errors::{ConfigurationError, InvocationError};
use crate::target::{InterfaceId, Method, TargetDescriptor};

/// How a resolved method is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<'d> {
    /// Through the method's advice chain.
    Intercepted(&'d Method),
    /// Straight to the target.
    Direct(&'d Method),
}

/// Callable surface of a proxy.
pub trait ProxyStrategy: Send + Sync {
    fn kind(&self) -> ProxyKind;

    fn runtime_type(&self) -> RuntimeType;

    /// Resolve a method name against this surface.
    fn resolve<'d>(
        &self,
        descriptor: &'d TargetDescriptor,
        method: &str,
    ) -> Result<Dispatch<'d>, InvocationError>;
}

/// Pick the strategy for a target.
///
/// Requested interfaces must all be implemented by the target, whatever the
/// strategy.
///
/// 1. `proxy_target_class` forces a subclass proxy.
/// 2. Explicitly requested interfaces give an interface proxy over exactly
///    those.
/// 3. Otherwise an interface proxy over every interface the target declares.
/// 4. A target without interfaces gets a subclass proxy.
pub fn select(
    config: &ProxyConfig,
    descriptor: &TargetDescriptor,
    requested: &[InterfaceId],
    chains: &HashMap<&'static str, AdviceChain>,
) -> Result<Box<dyn ProxyStrategy>, ConfigurationError> {
    if let Some(missing) = requested.iter().find(|i| !descriptor.implements(i)) {
        return Err(ConfigurationError::InterfaceNotImplemented {
            interface: missing.name(),
            target: descriptor.type_name(),
        });
    }

    if config.proxy_target_class {
        debug!(target_type = descriptor.type_name(), "Class proxying requested");
        return Ok(Box::new(SubclassProxy::new(descriptor, chains)?));
    }

    if !requested.is_empty() {
        return Ok(Box::new(InterfaceProxy::new(descriptor, requested.to_vec())?));
    }

    let declared = descriptor.interfaces();
    if declared.is_empty() {
        debug!(
            target_type = descriptor.type_name(),
            "Target declares no interfaces, falling back to subclass proxy"
        );
        return Ok(Box::new(SubclassProxy::new(descriptor, chains)?));
    }

    Ok(Box::new(InterfaceProxy::new(descriptor, declared)?))
}
