//! Subclass proxies and the generated-type table.
//!
//! A subclass proxy presents itself as a synthesized subtype of the target's
//! concrete type. The synthesized type is described by a [`GeneratedType`],
//! built once per (target type, intercepted method set) and shared by every
//! proxy with that shape.

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use super::strategy::{Dispatch, ProxyStrategy};
use super::{ProxyKind, RuntimeType};
use crate::chain::AdviceChain;
use crate::errors::{ConfigurationError, InvocationError};
use crate::target::{InterfaceId, TargetDescriptor};

type GeneratedTypeKey = (TypeId, BTreeSet<&'static str>);

static GENERATED_TYPES: OnceLock<RwLock<HashMap<GeneratedTypeKey, Arc<GeneratedType>>>> =
    OnceLock::new();
static NEXT_SERIAL: AtomicUsize = AtomicUsize::new(0);

/// Synthesized subtype of a target type.
#[derive(Debug)]
pub struct GeneratedType {
    name: String,
    parent: TypeId,
    parent_name: &'static str,
    interfaces: Vec<InterfaceId>,
    intercepted: BTreeSet<&'static str>,
}

impl GeneratedType {
    fn synthesize(descriptor: &TargetDescriptor, intercepted: BTreeSet<&'static str>) -> Self {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("{}$$AopProxy$${}", descriptor.type_name(), serial),
            parent: descriptor.type_id(),
            parent_name: descriptor.type_name(),
            interfaces: descriptor.interfaces(),
            intercepted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> TypeId {
        self.parent
    }

    pub fn parent_name(&self) -> &'static str {
        self.parent_name
    }

    /// Interfaces inherited from the parent type.
    pub fn interfaces(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// Methods overridden to route through the advice chain.
    pub fn intercepted_methods(&self) -> &BTreeSet<&'static str> {
        &self.intercepted
    }

    pub fn intercepts(&self, method: &str) -> bool {
        self.intercepted.contains(method)
    }
}

/// Look up or synthesize the generated type for this shape.
pub fn generated_type(
    descriptor: &TargetDescriptor,
    intercepted: BTreeSet<&'static str>,
) -> Arc<GeneratedType> {
    let cache = GENERATED_TYPES.get_or_init(Default::default);
    let key = (descriptor.type_id(), intercepted);

    if let Some(existing) = cache.read().get(&key) {
        return Arc::clone(existing);
    }

    match cache.write().entry(key) {
        Entry::Occupied(entry) => Arc::clone(entry.get()),
        Entry::Vacant(entry) => {
            let generated = Arc::new(GeneratedType::synthesize(descriptor, entry.key().1.clone()));
            debug!(
                generated = generated.name(),
                intercepted = ?generated.intercepted_methods(),
                "Synthesized subclass proxy type"
            );
            Arc::clone(entry.insert(generated))
        }
    }
}

/// Number of generated types synthesized so far in this process.
pub fn generated_type_count() -> usize {
    GENERATED_TYPES
        .get()
        .map(|cache| cache.read().len())
        .unwrap_or(0)
}

/// Proxy strategy that subclasses the target type.
///
/// Every declared method is callable. Non-final methods with advice route
/// through their chain; everything else calls the target directly.
pub struct SubclassProxy {
    generated: Arc<GeneratedType>,
}

impl SubclassProxy {
    pub fn new(
        descriptor: &TargetDescriptor,
        chains: &HashMap<&'static str, AdviceChain>,
    ) -> Result<Self, ConfigurationError> {
        if descriptor.is_sealed() {
            return Err(ConfigurationError::SealedTarget {
                target: descriptor.type_name(),
            });
        }

        let intercepted = descriptor
            .methods()
            .iter()
            .filter(|m| !m.is_final())
            .filter(|m| chains.get(m.name()).is_some_and(|chain| !chain.is_empty()))
            .map(|m| m.name())
            .collect();

        Ok(Self {
            generated: generated_type(descriptor, intercepted),
        })
    }

    pub fn generated_type(&self) -> &Arc<GeneratedType> {
        &self.generated
    }
}

impl ProxyStrategy for SubclassProxy {
    fn kind(&self) -> ProxyKind {
        ProxyKind::Subclass
    }

    fn runtime_type(&self) -> RuntimeType {
        RuntimeType::Subclass(Arc::clone(&self.generated))
    }

    fn resolve<'d>(
        &self,
        descriptor: &'d TargetDescriptor,
        method: &str,
    ) -> Result<Dispatch<'d>, InvocationError> {
        let resolved = descriptor
            .find_method(method)
            .ok_or_else(|| InvocationError::no_such_method(descriptor.type_name(), method))?;

        if self.generated.intercepts(resolved.name()) {
            Ok(Dispatch::Intercepted(resolved))
        } else {
            Ok(Dispatch::Direct(resolved))
        }
    }
}
