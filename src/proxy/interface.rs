//! Interface proxies.

use std::sync::Arc;

use super::strategy::{Dispatch, ProxyStrategy};
use super::{ProxyKind, RuntimeType};
use crate::errors::{ConfigurationError, InvocationError};
use crate::target::{InterfaceId, TargetDescriptor};

/// Proxy strategy that implements the target's interfaces by composition.
///
/// Only methods declared by a proxied interface are callable, and all of
/// them route through their advice chain.
pub struct InterfaceProxy {
    interfaces: Arc<[InterfaceId]>,
}

impl InterfaceProxy {
    pub fn new(
        descriptor: &TargetDescriptor,
        interfaces: Vec<InterfaceId>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(missing) = interfaces.iter().find(|i| !descriptor.implements(i)) {
            return Err(ConfigurationError::InterfaceNotImplemented {
                interface: missing.name(),
                target: descriptor.type_name(),
            });
        }

        Ok(Self {
            interfaces: interfaces.into(),
        })
    }

    pub fn interfaces(&self) -> &[InterfaceId] {
        &self.interfaces
    }
}

impl ProxyStrategy for InterfaceProxy {
    fn kind(&self) -> ProxyKind {
        ProxyKind::Interface
    }

    fn runtime_type(&self) -> RuntimeType {
        RuntimeType::Interfaces(Arc::clone(&self.interfaces))
    }

    fn resolve<'d>(
        &self,
        descriptor: &'d TargetDescriptor,
        method: &str,
    ) -> Result<Dispatch<'d>, InvocationError> {
        let resolved = descriptor
            .find_method(method)
            .ok_or_else(|| InvocationError::no_such_method(descriptor.type_name(), method))?;

        match resolved.interface() {
            Some(iface) if self.interfaces.contains(&iface) => Ok(Dispatch::Intercepted(resolved)),
            _ => Err(InvocationError::NotExposed {
                target: descriptor.type_name(),
                method: method.to_string(),
            }),
        }
    }
}
