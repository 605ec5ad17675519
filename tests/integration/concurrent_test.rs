//! Concurrent callers on shared proxies.

use std::sync::{Arc, Barrier};
use std::thread;

use aop_proxy::advice::CountingInterceptor;
use aop_proxy::{Advised, AdvicePlan, Advisor, ProxyConfig, ProxyContext, ProxyFactory, RuntimeType};

use crate::common::{ITestBean, TestBean};

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 50;

#[test]
fn test_concurrent_calls_are_all_advised() {
    let counter = CountingInterceptor::new();
    let mut factory = ProxyFactory::with_config(
        TestBean::new("tony"),
        ProxyConfig::class_proxy().with_expose_proxy(true),
    );
    factory.add_advice(counter.clone()).unwrap();
    let proxy = factory.get_proxy().unwrap();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let proxy = proxy.clone();
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..CALLS_PER_THREAD {
                    assert_eq!(proxy.get_name().unwrap(), "tony");
                }
                assert_eq!(ProxyContext::depth(), 0);
            });
        }
    });

    assert_eq!(counter.count(), THREADS * CALLS_PER_THREAD);
    assert_eq!(proxy.target().invocations(), THREADS * CALLS_PER_THREAD);
}

#[test]
fn test_each_thread_sees_its_own_proxy() {
    let plan = AdvicePlan::new(ProxyConfig::class_proxy().with_expose_proxy(true))
        .with_advisor(Advisor::around(CountingInterceptor::new()));
    let proxies: Vec<_> = (0..THREADS)
        .map(|i| plan.apply(TestBean::new(&format!("bean-{i}"))).unwrap())
        .collect();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for proxy in &proxies {
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..CALLS_PER_THREAD {
                    assert_eq!(proxy.exposed_proxy_id().unwrap(), proxy.id());
                }
            });
        }
    });
}

#[test]
fn test_concurrent_creation_shares_generated_type() {
    let barrier = Arc::new(Barrier::new(THREADS));

    let runtime_types: Vec<RuntimeType> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                scope.spawn(move || {
                    barrier.wait();
                    let mut factory =
                        ProxyFactory::with_config(TestBean::new("tony"), ProxyConfig::class_proxy());
                    factory.add_advice(CountingInterceptor::new()).unwrap();
                    factory.get_proxy().unwrap().runtime_type()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let generated: Vec<_> = runtime_types
        .into_iter()
        .map(|runtime_type| match runtime_type {
            RuntimeType::Subclass(generated) => generated,
            other => panic!("expected subclass runtime type, got {other:?}"),
        })
        .collect();
    assert!(generated.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}
