//! Uniform provider capability trait consumed by the cascade executor
//!
//! Shaped after the gateway's `synapse-llm::provider::Provider` trait:
//! `#[async_trait]`, `Send + Sync`, a `name()` accessor, and a completion
//! call. Narrowed to the capability surface this system actually needs
//! (chat, model listing, cost estimate, health) and generalized so the
//! orchestrator depends on one trait object rather than one struct per
//! vendor SDK, since real vendor HTTP clients are out of scope here.

mod error;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod retry;
pub mod stub;

use async_trait::async_trait;

pub use error::ProviderError;

/// One prior turn in a conversation, carried through to the provider call
#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Request shape every provider adapter accepts
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub id: String,
    pub content: String,
    pub system_prompt: Option<String>,
    pub conversation_history: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// Token usage reported by a provider call
#[derive(Debug, Clone, Copy)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

/// A citation attached to a provider response, e.g. from a search-grounded model
#[derive(Debug, Clone)]
pub struct ProviderCitation {
    pub url: String,
    pub hostname: String,
}

/// Response shape every provider adapter returns
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub id: String,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens: TokenUsage,
    pub cost: f64,
    pub response_time_ms: u64,
    pub citations: Vec<ProviderCitation>,
    pub finish_reason: Option<String>,
}

/// Uniform interface every provider adapter implements
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider natively performs live web search (affects
    /// cost-optimized routing's search-capability filter and the quality
    /// estimator's citation baseline)
    fn supports_web_search(&self) -> bool;

    async fn chat(&self, request: &ChatRequest, model: &str) -> Result<ChatResponse, ProviderError>;

    async fn available_models(&self) -> Vec<String>;

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> f64;

    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[tokio::test]
    async fn mock_provider_echoes_configured_response() {
        let provider = MockProvider::new("anthropic", false).with_fixed_response("hello there");
        let request = ChatRequest {
            id: "q1".to_owned(),
            content: "hi".to_owned(),
            system_prompt: None,
            conversation_history: Vec::new(),
            max_tokens: None,
            temperature: None,
        };
        let response = provider.chat(&request, "claude-haiku").await.expect("mock never fails by default");
        assert_eq!(response.content, "hello there");
        assert_eq!(response.provider, "anthropic");
    }
}
