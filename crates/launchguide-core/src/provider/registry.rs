//! Provider registry -- a named collection of available model providers.
//!
//! The CLI resolves the configured provider name (e.g. `provider.name =
//! "openai"`) through the registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::trait_def::ModelProvider;

/// A collection of registered [`ModelProvider`] implementations, keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under the name returned by [`ModelProvider::name`].
    ///
    /// Replaces and returns any provider already registered under that name.
    pub fn register(
        &mut self,
        provider: impl ModelProvider + 'static,
    ) -> Option<Arc<dyn ModelProvider>> {
        let name = provider.name().to_string();
        self.providers.insert(name, Arc::new(provider))
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(name).cloned()
    }

    /// Names of all registered providers, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list())
            .finish()
    }
}
