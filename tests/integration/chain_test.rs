//! Advice ordering, short-circuiting and error flow through a proxy.

use std::sync::Arc;

use aop_proxy::advice::{BeforeAdvice, CountingInterceptor, RetryInterceptor, ThrowsAdvice};
use aop_proxy::{
    interceptor_fn, Advisor, Arguments, InvocationError, Method, Pointcut, ProxyConfig,
    ProxyFactory, ReturnValue,
};

use crate::common::{entries, recording, BeanError, CallLog, ITestBean, TestBean};

#[test]
fn test_advice_runs_in_onion_order() {
    let log: CallLog = Arc::default();
    let mut factory = ProxyFactory::with_config(TestBean::new("tony"), ProxyConfig::class_proxy());
    factory
        .add_advice(recording("a", log.clone()))
        .unwrap()
        .add_advice(recording("b", log.clone()))
        .unwrap()
        .add_advice(recording("c", log.clone()))
        .unwrap();
    let proxy = factory.get_proxy().unwrap();

    proxy.get_name().unwrap();

    assert_eq!(
        entries(&log),
        vec!["before a", "before b", "before c", "after c", "after b", "after a"]
    );
}

#[test]
fn test_short_circuit_skips_target() {
    let log: CallLog = Arc::default();
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory
        .add_advice(recording("outer", log.clone()))
        .unwrap()
        .add_advice(interceptor_fn("cache", |_invocation| {
            Ok(ReturnValue::new("cached".to_string()))
        }))
        .unwrap()
        .add_advice(recording("inner", log.clone()))
        .unwrap();
    let proxy = factory.get_proxy().unwrap();

    assert_eq!(proxy.get_name().unwrap(), "cached");
    assert_eq!(proxy.target().invocations(), 0);
    assert_eq!(entries(&log), vec!["before outer", "after outer"]);
}

#[test]
fn test_target_error_passes_through_advice() {
    let log: CallLog = Arc::default();
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory.add_advice(recording("a", log.clone())).unwrap();
    let proxy = factory.get_proxy().unwrap();

    let err = proxy.fail("bad input").unwrap_err();

    assert_eq!(
        err.raised_as::<BeanError>(),
        Some(&BeanError("bad input".to_string()))
    );
    assert_eq!(entries(&log), vec!["before a", "after a"]);
}

#[test]
fn test_pointcut_selects_methods() {
    let getters = CountingInterceptor::new();
    let everything = CountingInterceptor::new();
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory
        .add_advisor(Advisor::around(getters.clone()).with_pointcut(Pointcut::methods(["get*"])))
        .unwrap()
        .add_advice(everything.clone())
        .unwrap();
    let proxy = factory.get_proxy().unwrap();

    proxy.set_name("anthony".to_string()).unwrap();
    proxy.get_name().unwrap();

    assert_eq!(getters.count(), 1);
    assert_eq!(everything.count(), 2);
    assert_eq!(proxy.chain_for("set_name").map(|chain| chain.len()), Some(1));
}

struct RejectEmptyNames;

impl BeforeAdvice for RejectEmptyNames {
    fn before(&self, method: &Method, args: &Arguments) -> Result<(), InvocationError> {
        if method.name() == "set_name" && args.get::<String>(method, 0)?.is_empty() {
            return Err(InvocationError::raised(BeanError("empty name".to_string())));
        }
        Ok(())
    }
}

#[test]
fn test_before_advice_can_veto() {
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory.add_advisor(Advisor::before(RejectEmptyNames)).unwrap();
    let proxy = factory.get_proxy().unwrap();

    let err = proxy.set_name(String::new()).unwrap_err();

    assert!(err.raised_as::<BeanError>().is_some());
    assert_eq!(proxy.get_name().unwrap(), "tony");
}

#[derive(Clone, Default)]
struct RecordFailures {
    seen: CallLog,
}

impl ThrowsAdvice for RecordFailures {
    fn after_throwing(&self, method: &Method, _args: &Arguments, error: &InvocationError) {
        self.seen
            .lock()
            .unwrap()
            .push(format!("{}: {error}", method.name()));
    }
}

#[test]
fn test_throws_advice_observes_failures() {
    let failures = RecordFailures::default();
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory
        .add_advisor(Advisor::after_throwing(failures.clone()))
        .unwrap();
    let proxy = factory.get_proxy().unwrap();

    proxy.get_name().unwrap();
    assert!(proxy.fail("boom").is_err());

    assert_eq!(entries(&failures.seen), vec!["fail: bean failure: boom"]);
}

#[test]
fn test_retry_reruns_target() {
    let mut factory = ProxyFactory::new(TestBean::new("tony"));
    factory
        .add_advisor(
            Advisor::around(RetryInterceptor::new(
                backon::ExponentialBuilder::default()
                    .with_min_delay(std::time::Duration::from_millis(1))
                    .with_max_times(2),
            ))
            .with_pointcut(Pointcut::methods(["fail"])),
        )
        .unwrap();
    let proxy = factory.get_proxy().unwrap();

    assert!(proxy.fail("always").is_err());

    // One attempt plus two retries.
    assert_eq!(proxy.target().invocations(), 3);
}
