//! Self-invocation through the exposed proxy.

use aop_proxy::advice::CountingInterceptor;
use aop_proxy::{ContextError, InvocationError, Proxy, ProxyConfig, ProxyContext, ProxyFactory};

use crate::common::{BeanError, ITestBean, TestBean};

fn build(config: ProxyConfig) -> (Proxy<TestBean>, CountingInterceptor) {
    let counter = CountingInterceptor::new();
    let mut factory = ProxyFactory::with_config(TestBean::new("tony"), config);
    factory.add_advice(counter.clone()).unwrap();
    (factory.get_proxy().unwrap(), counter)
}

#[test]
fn test_self_invocation_is_advised() {
    let (proxy, counter) = build(ProxyConfig::class_proxy().with_expose_proxy(true));

    assert_eq!(proxy.get_name_via_proxy().unwrap(), "tony");

    // Outer call plus the inner get_name through the proxy.
    assert_eq!(counter.count(), 2);
    assert_eq!(ProxyContext::depth(), 0);
}

#[test]
fn test_current_proxy_is_the_called_proxy() {
    let (proxy, _) = build(ProxyConfig::class_proxy().with_expose_proxy(true));
    let (other, _) = build(ProxyConfig::class_proxy().with_expose_proxy(true));

    assert_eq!(proxy.exposed_proxy_id().unwrap(), proxy.id());
    assert_eq!(other.exposed_proxy_id().unwrap(), other.id());
}

#[test]
fn test_interface_proxy_can_expose_too() {
    let (proxy, counter) = build(ProxyConfig::default().with_expose_proxy(true));

    assert_eq!(proxy.get_name_via_proxy().unwrap(), "tony");
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_current_proxy_fails_when_not_exposed() {
    let (proxy, counter) = build(ProxyConfig::class_proxy());

    let err = proxy.get_name_via_proxy().unwrap_err();

    assert!(matches!(
        err,
        InvocationError::Context(ContextError::NoProxyInScope)
    ));
    assert!(err.to_string().contains("expose_proxy"));
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_context_unwound_after_failure() {
    let (proxy, _) = build(ProxyConfig::class_proxy().with_expose_proxy(true));

    let err = proxy.fail("boom").unwrap_err();

    assert_eq!(err.raised_as::<BeanError>(), Some(&BeanError("boom".to_string())));
    assert_eq!(ProxyContext::depth(), 0);
    assert_eq!(
        aop_proxy::current_proxy::<TestBean>().unwrap_err(),
        ContextError::NoProxyInScope
    );

    // The proxy keeps working after the failure.
    assert_eq!(proxy.get_name_via_proxy().unwrap(), "tony");
}

#[test]
fn test_no_proxy_outside_calls() {
    let (proxy, _) = build(ProxyConfig::class_proxy().with_expose_proxy(true));
    proxy.get_name().unwrap();

    assert_eq!(
        aop_proxy::current_proxy::<TestBean>().unwrap_err(),
        ContextError::NoProxyInScope
    );
}
