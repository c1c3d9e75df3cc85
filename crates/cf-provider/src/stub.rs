//! Always-available runtime provider adapter
//!
//! Real per-vendor HTTP adapters sit outside this system's boundary — the
//! core specifies only the [`Provider`] capability a vendor client must
//! expose, the same way the gateway's `synapse-llm::provider::Provider`
//! trait decouples routing from any one SDK. [`StubProvider`] is the
//! concrete adapter this binary wires up at startup: it satisfies the
//! trait deterministically from static config (fixed per-token cost, a
//! canned reply template) so the orchestrator, server, and CLI are fully
//! runnable without a vendor SDK. Swapping in a real HTTP-backed adapter
//! means implementing [`Provider`] again, not touching any caller.

use async_trait::async_trait;

use crate::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};

/// A provider adapter backed by a fixed per-token cost and a template reply
pub struct StubProvider {
    name: String,
    supports_web_search: bool,
    models: Vec<String>,
    input_cost_per_1k: f64,
    output_cost_per_1k: f64,
}

impl StubProvider {
    #[must_use]
    pub fn new(name: impl Into<String>, supports_web_search: bool, models: Vec<String>, input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        Self {
            name: name.into(),
            supports_web_search,
            models,
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_web_search(&self) -> bool {
        self.supports_web_search
    }

    async fn chat(&self, request: &ChatRequest, model: &str) -> Result<ChatResponse, ProviderError> {
        if !self.models.iter().any(|m| m == model) {
            return Err(ProviderError::Upstream {
                provider: self.name.clone(),
                model: model.to_owned(),
                status: 404,
                message: "model not configured for this provider".to_owned(),
            });
        }

        let input = u32::try_from(request.content.len() / 4).unwrap_or(u32::MAX).max(1);
        let reply = format!("[{model}] acknowledging: {}", request.content);
        let output = u32::try_from(reply.len() / 4).unwrap_or(u32::MAX).max(1);

        Ok(ChatResponse {
            id: request.id.clone(),
            content: reply,
            provider: self.name.clone(),
            model: model.to_owned(),
            tokens: TokenUsage { input, output, total: input + output },
            cost: self.estimate_cost(input, output, model),
            response_time_ms: 50,
            citations: Vec::new(),
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn available_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, _model: &str) -> f64 {
        f64::from(input_tokens) / 1000.0 * self.input_cost_per_1k + f64::from(output_tokens) / 1000.0 * self.output_cost_per_1k
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_model_is_rejected() {
        let provider = StubProvider::new("openai", false, vec!["gpt-4o".to_owned()], 0.0025, 0.01);
        let request = ChatRequest {
            id: "q1".to_owned(),
            content: "hi".to_owned(),
            system_prompt: None,
            conversation_history: Vec::new(),
            max_tokens: None,
            temperature: None,
        };
        let err = provider.chat(&request, "gpt-5").await.unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { .. }));
    }

    #[tokio::test]
    async fn configured_model_echoes_deterministically() {
        let provider = StubProvider::new("openai", false, vec!["gpt-4o".to_owned()], 0.0025, 0.01);
        let request = ChatRequest {
            id: "q1".to_owned(),
            content: "hi".to_owned(),
            system_prompt: None,
            conversation_history: Vec::new(),
            max_tokens: None,
            temperature: None,
        };
        let response = provider.chat(&request, "gpt-4o").await.unwrap();
        assert!(response.content.contains("hi"));
        assert!(response.cost > 0.0);
    }
}
