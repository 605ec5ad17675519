//! Per-thread proxy context.
//!
//! While a call made through a proxy built with `expose_proxy` is in flight,
//! that proxy is published here so the target can call back into itself
//! through its advice. Each thread has its own stack of exposed proxies; a
//! proxy is pushed when the call enters and popped when it has fully unwound,
//! whether the call returned or failed.

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::marker::PhantomData;

use tracing::trace;
use uuid::Uuid;

use crate::proxy::Proxy;
use crate::target::Advisable;

/// Errors from proxy context lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error(
        "Cannot find current proxy: set 'expose_proxy' to true on the proxy configuration \
         and call current_proxy() on the thread handling the proxied call"
    )]
    NoProxyInScope,

    #[error("Current proxy targets {actual}, not {expected}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

struct ExposedProxy {
    id: Uuid,
    target_type: &'static str,
    handle: Box<dyn Any>,
}

thread_local! {
    static EXPOSED: RefCell<Vec<ExposedProxy>> = const { RefCell::new(Vec::new()) };
}

/// Pops the exposed proxy when dropped.
///
/// Tied to the thread that created it.
#[must_use]
pub(crate) struct ContextGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = EXPOSED.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(stack.len(), self.depth, "proxy context unwound out of order");
            if let Some(popped) = stack.pop() {
                trace!(proxy = %popped.id, depth = self.depth, "Proxy context exited");
            }
        });
    }
}

/// Access to the proxy exposed on the current thread.
pub struct ProxyContext;

impl ProxyContext {
    pub(crate) fn enter<T: Advisable>(proxy: &Proxy<T>) -> ContextGuard {
        let depth = EXPOSED.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(ExposedProxy {
                id: proxy.id(),
                target_type: type_name::<T>(),
                handle: Box::new(proxy.clone()),
            });
            stack.len()
        });
        trace!(proxy = %proxy.id(), depth, "Proxy context entered");

        ContextGuard {
            depth,
            _not_send: PhantomData,
        }
    }

    /// The innermost exposed proxy on this thread, as a proxy of `T`.
    pub fn current_proxy<T: Advisable>() -> Result<Proxy<T>, ContextError> {
        EXPOSED.with(|stack| {
            let stack = stack.borrow();
            let top = stack.last().ok_or(ContextError::NoProxyInScope)?;
            top.handle
                .downcast_ref::<Proxy<T>>()
                .cloned()
                .ok_or(ContextError::TypeMismatch {
                    expected: type_name::<T>(),
                    actual: top.target_type,
                })
        })
    }

    /// Id of the innermost exposed proxy, whatever its target type.
    pub fn current_proxy_id() -> Option<Uuid> {
        EXPOSED.with(|stack| stack.borrow().last().map(|exposed| exposed.id))
    }

    /// Number of exposed proxies currently stacked on this thread.
    pub fn depth() -> usize {
        EXPOSED.with(|stack| stack.borrow().len())
    }

    pub fn is_active() -> bool {
        Self::depth() > 0
    }
}

/// Shorthand for [`ProxyContext::current_proxy`].
pub fn current_proxy<T: Advisable>() -> Result<Proxy<T>, ContextError> {
    ProxyContext::current_proxy::<T>()
}
