//! Helpers for inspecting values that may or may not be proxies.

use std::any::TypeId;

use crate::proxy::{Advised, ProxyIntrospect, ProxyKind};

pub fn is_aop_proxy<O: ProxyIntrospect + ?Sized>(obj: &O) -> bool {
    obj.proxy_info().is_some()
}

pub fn is_subclass_proxy<O: ProxyIntrospect + ?Sized>(obj: &O) -> bool {
    obj.proxy_info()
        .is_some_and(|info| info.kind == ProxyKind::Subclass)
}

pub fn is_interface_proxy<O: ProxyIntrospect + ?Sized>(obj: &O) -> bool {
    obj.proxy_info()
        .is_some_and(|info| info.kind == ProxyKind::Interface)
}

/// Whether `obj` is a proxy that publishes itself to the proxy context.
///
/// Answered for opaque proxies too.
pub fn is_expose_proxy<O: ProxyIntrospect + ?Sized>(obj: &O) -> bool {
    obj.proxy_info().is_some_and(|info| info.expose_proxy)
}

/// The type behind `obj`: the target type for a proxy, `O` itself otherwise.
pub fn target_class<O: ProxyIntrospect + 'static>(obj: &O) -> TypeId {
    obj.proxy_info()
        .map(|info| info.target_class)
        .unwrap_or_else(TypeId::of::<O>)
}

/// The `Advised` view of `obj`, if it is a non-opaque proxy.
pub fn advised<O: ProxyIntrospect + ?Sized>(obj: &O) -> Option<&dyn Advised> {
    obj.as_advised()
}
