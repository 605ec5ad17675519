//! aop-proxy-demo: proxies a sample bean and reports what the engine built.
//!
//! ## Configuration
//! - AOP_PROXY_CONFIG: YAML config file (optional, `config.yaml` is also read)
//! - AOP_PROXY__PROXY__*: overrides for individual proxy options
//! - AOP_PROXY_LOG: log filter (default: info)
//!
//! The bean's `describe` method calls back through its own proxy when
//! `expose_proxy` is enabled, so the logging advice shows up for both calls.

use parking_lot::RwLock;
use tracing::{info, warn};

use aop_proxy::advice::{CountingInterceptor, LoggingInterceptor};
use aop_proxy::aop_utils;
use aop_proxy::utils::bootstrap::bootstrap;
use aop_proxy::{
    args, current_proxy, Advisable, Arguments, InvocationError, InvocationResult, Method, Proxy,
    ProxyFactory, ReturnValue, TargetDescriptor,
};

trait Greeter {
    fn name(&self) -> Result<String, InvocationError>;
    fn set_name(&self, name: String) -> Result<(), InvocationError>;
    fn describe(&self) -> Result<String, InvocationError>;
}

struct SampleBean {
    name: RwLock<String>,
}

impl SampleBean {
    fn new(name: &str) -> Self {
        Self {
            name: RwLock::new(name.to_string()),
        }
    }

    fn current_name(&self) -> String {
        self.name.read().clone()
    }
}

impl Advisable for SampleBean {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::of::<SampleBean>()
            .method(Method::new("name").declared_by::<dyn Greeter>())
            .method(Method::new("set_name").declared_by::<dyn Greeter>())
            .method(Method::new("describe").declared_by::<dyn Greeter>())
    }

    fn dispatch(&self, method: &Method, args: &Arguments) -> InvocationResult {
        match method.name() {
            "name" => Ok(ReturnValue::new(self.current_name())),
            "set_name" => {
                let name = args.get::<String>(method, 0)?.clone();
                *self.name.write() = name;
                Ok(ReturnValue::unit())
            }
            "describe" => {
                // Go through the proxy so the call is advised too.
                let name = match current_proxy::<SampleBean>() {
                    Ok(proxy) => proxy.name()?,
                    Err(_) => self.current_name(),
                };
                Ok(ReturnValue::new(format!("SampleBean({name})")))
            }
            other => Err(InvocationError::no_such_method("SampleBean", other)),
        }
    }
}

impl Greeter for Proxy<SampleBean> {
    fn name(&self) -> Result<String, InvocationError> {
        self.call("name", args![])
    }

    fn set_name(&self, name: String) -> Result<(), InvocationError> {
        self.call("set_name", args![name])
    }

    fn describe(&self) -> Result<String, InvocationError> {
        self.call("describe", args![])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = bootstrap(None)?;

    let counter = CountingInterceptor::new();
    let mut factory = ProxyFactory::with_config(SampleBean::new("tony"), config.proxy.clone());
    factory
        .add_advice(LoggingInterceptor::with_label("demo"))?
        .add_advice(counter.clone())?;
    let proxy = factory.get_proxy()?;

    info!(
        proxy = %proxy.id(),
        kind = %proxy.kind(),
        is_aop_proxy = aop_utils::is_aop_proxy(&proxy),
        is_subclass_proxy = aop_utils::is_subclass_proxy(&proxy),
        is_interface_proxy = aop_utils::is_interface_proxy(&proxy),
        is_expose_proxy = aop_utils::is_expose_proxy(&proxy),
        "Proxy created"
    );

    match aop_utils::advised(&proxy) {
        Some(advised) => info!(
            target_class = advised.target_class_name(),
            runtime_type = %advised.runtime_type().name(),
            advisors = advised.advisors().len(),
            "Advised view"
        ),
        None => warn!("Proxy is opaque, advised view unavailable"),
    }

    proxy.set_name("anthony".to_string())?;
    let description = proxy.describe()?;

    info!(
        description = %description,
        advised_calls = counter.count(),
        "Demo finished"
    );

    Ok(())
}
