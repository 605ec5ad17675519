//! Advisors: which advice applies to which method.
//!
//! An [`Advisor`] pairs one [`Advice`] with a [`Pointcut`]. When a proxy is
//! built, the chain for each method is the ordered subset of advisors whose
//! pointcut matches that method, each adapted into a [`MethodInterceptor`].

use std::fmt;
use std::sync::Arc;

use crate::advice::{
    AfterReturningAdvice, AfterReturningAdviceInterceptor, BeforeAdvice, BeforeAdviceInterceptor,
    ThrowsAdvice, ThrowsAdviceInterceptor,
};
use crate::invocation::MethodInterceptor;
use crate::target::{InterfaceId, Method};

/// Method matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pointcut {
    /// Every method.
    All,
    /// Methods whose name matches any of the patterns (`*` wildcards).
    Methods(Vec<String>),
    /// Methods declared by the interface.
    Interface(InterfaceId),
}

impl Pointcut {
    pub fn methods<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pointcut::Methods(patterns.into_iter().map(Into::into).collect())
    }

    pub fn interface<I: ?Sized + 'static>() -> Self {
        Pointcut::Interface(InterfaceId::of::<I>())
    }

    pub fn matches(&self, method: &Method) -> bool {
        match self {
            Pointcut::All => true,
            Pointcut::Methods(patterns) => patterns.iter().any(|p| simple_match(p, method.name())),
            Pointcut::Interface(iface) => method.interface().as_ref() == Some(iface),
        }
    }
}

/// Match `s` against a pattern where `*` stands for any run of characters.
///
/// Supports `get*`, `*Name`, `*Na*`, `set*Name` and a lone `*`.
pub fn simple_match(pattern: &str, s: &str) -> bool {
    let Some(first) = pattern.find('*') else {
        return pattern == s;
    };

    if first == 0 {
        if pattern.len() == 1 {
            return true;
        }
        let after = &pattern[1..];
        let Some(next) = after.find('*') else {
            return s.ends_with(after);
        };
        let part = &after[..next];
        let rest = &after[next..];
        if part.is_empty() {
            return simple_match(rest, s);
        }
        return s
            .char_indices()
            .filter(|(i, _)| s[*i..].starts_with(part))
            .any(|(i, _)| simple_match(rest, &s[i + part.len()..]));
    }

    let (prefix, rest) = pattern.split_at(first);
    s.starts_with(prefix) && simple_match(rest, &s[prefix.len()..])
}

/// Any kind of advice the engine can place in a chain.
#[derive(Clone)]
pub enum Advice {
    Around(Arc<dyn MethodInterceptor>),
    Before(Arc<dyn BeforeAdvice>),
    AfterReturning(Arc<dyn AfterReturningAdvice>),
    AfterThrowing(Arc<dyn ThrowsAdvice>),
}

impl Advice {
    /// The around-style interceptor that runs this advice.
    pub fn interceptor(&self) -> Arc<dyn MethodInterceptor> {
        match self {
            Advice::Around(interceptor) => Arc::clone(interceptor),
            Advice::Before(advice) => Arc::new(BeforeAdviceInterceptor::new(Arc::clone(advice))),
            Advice::AfterReturning(advice) => {
                Arc::new(AfterReturningAdviceInterceptor::new(Arc::clone(advice)))
            }
            Advice::AfterThrowing(advice) => {
                Arc::new(ThrowsAdviceInterceptor::new(Arc::clone(advice)))
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Advice::Around(_) => "around",
            Advice::Before(_) => "before",
            Advice::AfterReturning(_) => "after_returning",
            Advice::AfterThrowing(_) => "after_throwing",
        }
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Advice::{}", self.kind())
    }
}

/// Advice plus the pointcut selecting the methods it applies to.
#[derive(Debug, Clone)]
pub struct Advisor {
    pointcut: Pointcut,
    advice: Advice,
}

impl Advisor {
    pub fn new(pointcut: Pointcut, advice: Advice) -> Self {
        Self { pointcut, advice }
    }

    /// Around advice applied to every method.
    pub fn around(interceptor: impl MethodInterceptor + 'static) -> Self {
        Self::new(Pointcut::All, Advice::Around(Arc::new(interceptor)))
    }

    pub fn before(advice: impl BeforeAdvice + 'static) -> Self {
        Self::new(Pointcut::All, Advice::Before(Arc::new(advice)))
    }

    pub fn after_returning(advice: impl AfterReturningAdvice + 'static) -> Self {
        Self::new(Pointcut::All, Advice::AfterReturning(Arc::new(advice)))
    }

    pub fn after_throwing(advice: impl ThrowsAdvice + 'static) -> Self {
        Self::new(Pointcut::All, Advice::AfterThrowing(Arc::new(advice)))
    }

    /// Restrict this advisor to the methods matched by `pointcut`.
    pub fn with_pointcut(mut self, pointcut: Pointcut) -> Self {
        self.pointcut = pointcut;
        self
    }

    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    pub fn advice(&self) -> &Advice {
        &self.advice
    }

    pub fn matches(&self, method: &Method) -> bool {
        self.pointcut.matches(method)
    }
}
