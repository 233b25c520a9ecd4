use sidequest_types::Provider;
use std::collections::HashMap;
use std::sync::Arc;

use crate::host::ObserverHost;

/// Provider-specific guess at which regions hold assistant answers
pub trait RegionStrategy<H: ObserverHost>: Send + Sync {
    fn candidates(&self, host: &H) -> Vec<H::Region>;
}

/// Trusts the host's own enumeration
pub struct HostCandidates;

impl<H: ObserverHost> RegionStrategy<H> for HostCandidates {
    fn candidates(&self, host: &H) -> Vec<H::Region> {
        host.candidate_regions()
    }
}

/// Strategy per detected provider, with a fallback for the rest
pub struct StrategySet<H: ObserverHost> {
    by_provider: HashMap<Provider, Arc<dyn RegionStrategy<H>>>,
    fallback: Arc<dyn RegionStrategy<H>>,
}

impl<H: ObserverHost> StrategySet<H> {
    pub fn new() -> Self {
        Self {
            by_provider: HashMap::new(),
            fallback: Arc::new(HostCandidates),
        }
    }

    pub fn with_strategy(mut self, provider: Provider, strategy: Arc<dyn RegionStrategy<H>>) -> Self {
        self.by_provider.insert(provider, strategy);
        self
    }

    pub fn with_fallback(mut self, strategy: Arc<dyn RegionStrategy<H>>) -> Self {
        self.fallback = strategy;
        self
    }

    pub fn for_provider(&self, provider: Provider) -> &dyn RegionStrategy<H> {
        self.by_provider
            .get(&provider)
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl<H: ObserverHost> Default for StrategySet<H> {
    fn default() -> Self {
        Self::new()
    }
}
