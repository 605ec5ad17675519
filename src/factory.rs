//! Proxy factory: turns a target plus advice into a [`Proxy`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::advisor::Advisor;
use crate::chain::AdviceChain;
use crate::config::ProxyConfig;
use crate::errors::ConfigurationError;
use crate::invocation::MethodInterceptor;
use crate::proxy::{select_strategy, Proxy};
use crate::target::{Advisable, InterfaceId};

/// Builder of proxies for one target instance.
///
/// Advice is applied in the order it was added: the first advisor is the
/// outermost around the target.
pub struct ProxyFactory<T: Advisable> {
    target: Arc<T>,
    advisors: Vec<Advisor>,
    interfaces: Vec<InterfaceId>,
    config: ProxyConfig,
}

impl<T: Advisable> ProxyFactory<T> {
    pub fn new(target: T) -> Self {
        Self::from_arc(Arc::new(target))
    }

    /// Factory over a target that is already shared.
    pub fn from_arc(target: Arc<T>) -> Self {
        Self {
            target,
            advisors: Vec::new(),
            interfaces: Vec::new(),
            config: ProxyConfig::default(),
        }
    }

    pub fn with_config(target: T, config: ProxyConfig) -> Self {
        let mut factory = Self::new(target);
        factory.config = config;
        factory
    }

    /// One-shot construction from an explicit advisor list and configuration.
    pub fn create_proxy(
        target: Arc<T>,
        advisors: Vec<Advisor>,
        config: ProxyConfig,
    ) -> Result<Proxy<T>, ConfigurationError> {
        Self {
            target,
            advisors,
            interfaces: Vec::new(),
            config,
        }
        .get_proxy()
    }

    pub fn set_proxy_target_class(&mut self, proxy_target_class: bool) -> &mut Self {
        self.config.proxy_target_class = proxy_target_class;
        self
    }

    pub fn set_expose_proxy(&mut self, expose_proxy: bool) -> &mut Self {
        self.config.expose_proxy = expose_proxy;
        self
    }

    pub fn set_opaque(&mut self, opaque: bool) -> &mut Self {
        self.config.opaque = opaque;
        self
    }

    /// Once frozen, advice can no longer be added or removed.
    pub fn set_frozen(&mut self, frozen: bool) -> &mut Self {
        self.config.frozen = frozen;
        self
    }

    pub fn set_allow_empty_chain(&mut self, allow: bool) -> &mut Self {
        self.config.allow_empty_chain = allow;
        self
    }

    /// Restrict an interface proxy to `I` (may be called for several).
    pub fn add_interface<I: ?Sized + 'static>(&mut self) -> &mut Self {
        let interface = InterfaceId::of::<I>();
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// Add around advice applying to every method.
    pub fn add_advice(
        &mut self,
        interceptor: impl MethodInterceptor + 'static,
    ) -> Result<&mut Self, ConfigurationError> {
        self.add_advisor(Advisor::around(interceptor))
    }

    pub fn add_advisor(&mut self, advisor: Advisor) -> Result<&mut Self, ConfigurationError> {
        self.check_not_frozen()?;
        self.advisors.push(advisor);
        Ok(self)
    }

    pub fn remove_advisor(&mut self, index: usize) -> Result<Advisor, ConfigurationError> {
        self.check_not_frozen()?;
        if index >= self.advisors.len() {
            return Err(ConfigurationError::AdvisorIndex {
                index,
                len: self.advisors.len(),
            });
        }
        Ok(self.advisors.remove(index))
    }

    pub fn advisors(&self) -> &[Advisor] {
        &self.advisors
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    fn check_not_frozen(&self) -> Result<(), ConfigurationError> {
        if self.config.frozen {
            Err(ConfigurationError::Frozen)
        } else {
            Ok(())
        }
    }

    /// Build a proxy from the current advice and configuration.
    ///
    /// Later changes to the factory do not affect proxies already built.
    pub fn get_proxy(&self) -> Result<Proxy<T>, ConfigurationError> {
        let descriptor = T::descriptor();

        if self.advisors.is_empty() && !self.config.allow_empty_chain {
            return Err(ConfigurationError::EmptyAdviceChain {
                target: descriptor.type_name(),
            });
        }

        let chains: HashMap<&'static str, AdviceChain> = descriptor
            .methods()
            .iter()
            .map(|method| (method.name(), AdviceChain::for_method(&self.advisors, method)))
            .collect();

        let strategy = select_strategy(&self.config, &descriptor, &self.interfaces, &chains)?;

        debug!(
            target_type = descriptor.type_name(),
            kind = %strategy.kind(),
            runtime_type = %strategy.runtime_type().name(),
            advisors = self.advisors.len(),
            expose_proxy = self.config.expose_proxy,
            "Created proxy"
        );

        Ok(Proxy::new(
            Arc::clone(&self.target),
            descriptor,
            strategy,
            chains,
            self.advisors.clone(),
            self.config.clone(),
        ))
    }
}

/// Reusable advice and configuration, applicable to any number of targets.
#[derive(Debug, Clone, Default)]
pub struct AdvicePlan {
    pub advisors: Vec<Advisor>,
    pub config: ProxyConfig,
}

impl AdvicePlan {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            advisors: Vec::new(),
            config,
        }
    }

    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisors.push(advisor);
        self
    }

    pub fn apply<T: Advisable>(&self, target: T) -> Result<Proxy<T>, ConfigurationError> {
        ProxyFactory::create_proxy(Arc::new(target), self.advisors.clone(), self.config.clone())
    }
}
