//! Target model: what a proxyable type looks like to the engine.
//!
//! Rust has no runtime reflection, so a type opts into proxying by
//! implementing [`Advisable`]: it describes its interceptable methods in a
//! [`TargetDescriptor`] and provides a single reflective [`dispatch`] entry
//! point that the end of every advice chain calls.
//!
//! [`dispatch`]: Advisable::dispatch

use std::any::{type_name, TypeId};
use std::fmt;

use crate::errors::InvocationResult;
use crate::invocation::Arguments;

/// Identity of an interface (a trait) a target implements.
///
/// Built from the trait object type, e.g. `InterfaceId::of::<dyn Greeter>()`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId {
    type_id: TypeId,
    name: &'static str,
}

impl InterfaceId {
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            name: type_name::<I>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({})", self.name)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of one method on a target type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    name: &'static str,
    interface: Option<InterfaceId>,
    is_final: bool,
}

impl Method {
    /// A class-only method with no declaring interface.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            interface: None,
            is_final: false,
        }
    }

    /// Mark the method as declared by interface `I`.
    pub fn declared_by<I: ?Sized + 'static>(mut self) -> Self {
        self.interface = Some(InterfaceId::of::<I>());
        self
    }

    /// Final methods cannot be overridden, so subclass proxies call them directly.
    pub fn final_method(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interface(&self) -> Option<InterfaceId> {
        self.interface
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interface {
            Some(iface) => write!(f, "{}::{}", iface.name(), self.name),
            None => f.write_str(self.name),
        }
    }
}

/// Shape of a proxyable type.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    methods: Vec<Method>,
    sealed: bool,
}

impl TargetDescriptor {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            methods: Vec::new(),
            sealed: false,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// A sealed type cannot be subclassed, only proxied through its interfaces.
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Distinct interfaces declared by the methods, in declaration order.
    pub fn interfaces(&self) -> Vec<InterfaceId> {
        let mut interfaces: Vec<InterfaceId> = Vec::new();
        for iface in self.methods.iter().filter_map(|m| m.interface) {
            if !interfaces.contains(&iface) {
                interfaces.push(iface);
            }
        }
        interfaces
    }

    pub fn implements(&self, interface: &InterfaceId) -> bool {
        self.methods.iter().any(|m| m.interface.as_ref() == Some(interface))
    }
}

/// A type whose method calls can be routed through an advice chain.
pub trait Advisable: Send + Sync + 'static {
    /// Describe the interceptable methods of this type.
    fn descriptor() -> TargetDescriptor
    where
        Self: Sized;

    /// Invoke `method` on this instance.
    ///
    /// Called once the advice chain is exhausted. Implementations match on
    /// [`Method::name`] and return [`InvocationError::NoSuchMethod`] for
    /// anything they do not recognise.
    ///
    /// [`InvocationError::NoSuchMethod`]: crate::errors::InvocationError::NoSuchMethod
    fn dispatch(&self, method: &Method, args: &Arguments) -> InvocationResult;
}
