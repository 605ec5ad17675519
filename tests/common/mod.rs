//! Shared fixtures for integration tests.
//!
//! `TestBean` is a small named bean whose call surface is the `ITestBean`
//! trait, implemented on `Proxy<TestBean>` by forwarding to the proxy.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parking_lot::RwLock;
use uuid::Uuid;

use aop_proxy::{
    args, current_proxy, interceptor_fn, Advisable, Arguments, InvocationError, InvocationResult,
    Method, MethodInterceptor, Proxy, ReturnValue, TargetDescriptor,
};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("bean failure: {0}")]
pub struct BeanError(pub String);

pub trait ITestBean {
    fn get_name(&self) -> Result<String, InvocationError>;
    fn set_name(&self, name: String) -> Result<(), InvocationError>;
    fn fail(&self, reason: &str) -> Result<(), InvocationError>;
    /// Reads the name back through the current proxy.
    fn get_name_via_proxy(&self) -> Result<String, InvocationError>;
    /// Id of the proxy exposed while the call runs.
    fn exposed_proxy_id(&self) -> Result<Uuid, InvocationError>;
}

pub struct TestBean {
    name: RwLock<String>,
    invocations: AtomicUsize,
}

impl TestBean {
    pub fn new(name: &str) -> Self {
        Self {
            name: RwLock::new(name.to_string()),
            invocations: AtomicUsize::new(0),
        }
    }

    /// Calls that reached the bean itself.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl Advisable for TestBean {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::of::<TestBean>()
            .method(Method::new("get_name").declared_by::<dyn ITestBean>())
            .method(Method::new("set_name").declared_by::<dyn ITestBean>())
            .method(Method::new("fail").declared_by::<dyn ITestBean>())
            .method(Method::new("get_name_via_proxy").declared_by::<dyn ITestBean>())
            .method(Method::new("exposed_proxy_id").declared_by::<dyn ITestBean>())
    }

    fn dispatch(&self, method: &Method, args: &Arguments) -> InvocationResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match method.name() {
            "get_name" => Ok(ReturnValue::new(self.name.read().clone())),
            "set_name" => {
                let name = args.get::<String>(method, 0)?.clone();
                *self.name.write() = name;
                Ok(ReturnValue::unit())
            }
            "fail" => {
                let reason = args.get::<String>(method, 0)?;
                Err(InvocationError::raised(BeanError(reason.clone())))
            }
            "get_name_via_proxy" => {
                let proxy = current_proxy::<TestBean>()?;
                Ok(ReturnValue::new(proxy.get_name()?))
            }
            "exposed_proxy_id" => Ok(ReturnValue::new(current_proxy::<TestBean>()?.id())),
            other => Err(InvocationError::no_such_method("TestBean", other)),
        }
    }
}

impl ITestBean for Proxy<TestBean> {
    fn get_name(&self) -> Result<String, InvocationError> {
        self.call("get_name", args![])
    }

    fn set_name(&self, name: String) -> Result<(), InvocationError> {
        self.call("set_name", args![name])
    }

    fn fail(&self, reason: &str) -> Result<(), InvocationError> {
        self.call("fail", args![reason.to_string()])
    }

    fn get_name_via_proxy(&self) -> Result<String, InvocationError> {
        self.call("get_name_via_proxy", args![])
    }

    fn exposed_proxy_id(&self) -> Result<Uuid, InvocationError> {
        self.call("exposed_proxy_id", args![])
    }
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Around advice that records entry and exit under `label`.
pub fn recording(label: &'static str, log: CallLog) -> impl MethodInterceptor {
    interceptor_fn(label, move |invocation| {
        log.lock().unwrap().push(format!("before {label}"));
        let result = invocation.proceed();
        log.lock().unwrap().push(format!("after {label}"));
        result
    })
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
