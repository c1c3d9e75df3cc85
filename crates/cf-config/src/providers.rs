//! Per-provider credential and cost-profile configuration

use secrecy::SecretString;
use serde::Deserialize;

/// One upstream LLM provider's credentials and model roster
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key for this provider; absent means the adapter is disabled
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Model identifiers this provider is permitted to serve
    #[serde(default)]
    pub models: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_without_api_key_deserializes_as_disabled() {
        let cfg: ProviderConfig = toml::from_str("models = [\"gpt-4o\"]").unwrap();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.models, vec!["gpt-4o"]);
    }
}
