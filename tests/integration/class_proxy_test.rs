//! Class-based proxying of a bean that also has interfaces.

use std::any::TypeId;

use aop_proxy::advice::{CountingInterceptor, LoggingInterceptor};
use aop_proxy::{aop_utils, Advised, InterfaceId, ProxyConfig, ProxyFactory, ProxyKind, RuntimeType};

use crate::common::{ITestBean, TestBean};

#[test]
fn test_class_proxy_with_exposed_proxy() {
    let logging = LoggingInterceptor::new();
    let mut factory = ProxyFactory::with_config(
        TestBean::new("tony"),
        ProxyConfig::class_proxy().with_expose_proxy(true),
    );
    factory.add_advice(logging.clone()).unwrap();
    let proxy = factory.get_proxy().unwrap();

    assert!(aop_utils::is_aop_proxy(&proxy));
    assert!(aop_utils::is_subclass_proxy(&proxy));
    assert!(aop_utils::is_expose_proxy(&proxy));
    assert!(proxy.is_instance_of::<TestBean>());
    assert_eq!(aop_utils::target_class(&proxy), TypeId::of::<TestBean>());

    assert_eq!(proxy.get_name().unwrap(), "tony");
    assert_eq!(logging.calls(), 1);
    assert_eq!(proxy.target().invocations(), 1);
}

#[test]
fn test_subclass_runtime_type_keeps_interfaces() {
    let proxy = ProxyFactory::with_config(TestBean::new("tony"), ProxyConfig::class_proxy())
        .get_proxy()
        .unwrap();

    let runtime_type = proxy.runtime_type();
    assert!(matches!(runtime_type, RuntimeType::Subclass(_)));
    assert!(runtime_type.is_subclass_of(TypeId::of::<TestBean>()));
    assert!(runtime_type.implements(&InterfaceId::of::<dyn ITestBean>()));
    assert!(runtime_type.name().contains("TestBean$$AopProxy$$"));
}

#[test]
fn test_default_config_gives_interface_proxy() {
    let proxy = ProxyFactory::new(TestBean::new("tony")).get_proxy().unwrap();

    assert_eq!(proxy.kind(), ProxyKind::Interface);
    assert!(aop_utils::is_interface_proxy(&proxy));
    assert!(!proxy.is_instance_of::<TestBean>());
    assert!(proxy.runtime_type().implements(&InterfaceId::of::<dyn ITestBean>()));
    assert_eq!(proxy.get_name().unwrap(), "tony");
}

#[test]
fn test_writes_reach_target() {
    let proxy = ProxyFactory::with_config(TestBean::new("tony"), ProxyConfig::class_proxy())
        .get_proxy()
        .unwrap();

    proxy.set_name("anthony".to_string()).unwrap();

    assert_eq!(proxy.get_name().unwrap(), "anthony");
    assert_eq!(proxy.target().invocations(), 2);
}

#[test]
fn test_advised_view_snapshot() {
    let mut factory = ProxyFactory::with_config(
        TestBean::new("tony"),
        ProxyConfig::class_proxy().with_expose_proxy(true),
    );
    factory.add_advice(CountingInterceptor::new()).unwrap();
    let proxy = factory.get_proxy().unwrap();

    let advised = aop_utils::advised(&proxy).unwrap();
    assert_eq!(advised.proxy_kind(), ProxyKind::Subclass);
    assert!(advised.is_proxy_target_class());
    assert!(advised.is_expose_proxy());
    assert!(!advised.is_frozen());
    assert!(advised.target_class_name().ends_with("TestBean"));
    assert_eq!(advised.advisors().len(), 1);
}
