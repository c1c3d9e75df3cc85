//! Provider-name-keyed lookup table, shared by the cascade executor and the
//! direct (non-cascade) call path.

use std::collections::HashMap;
use std::sync::Arc;

use cascadeflow_provider::Provider;

/// Maps a provider name (e.g. `"openai"`) to its configured adapter
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_owned(), provider);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_provider::mock::MockProvider;

    #[test]
    fn lookup_by_the_name_a_provider_reports() {
        let mut registry = ProviderRegistry::new();
        registry.insert(Arc::new(MockProvider::new("anthropic", false)));
        assert!(registry.get("anthropic").is_some());
        assert!(registry.get("openai").is_none());
    }
}
