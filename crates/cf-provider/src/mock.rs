//! Test double for [`crate::Provider`], gated behind `cfg(test)` or the `testing` feature

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};

/// Configurable stand-in for a real provider adapter in orchestrator tests
pub struct MockProvider {
    name: String,
    supports_web_search: bool,
    fixed_response: Mutex<String>,
    fail_next: AtomicBool,
    healthy: AtomicBool,
    call_count: AtomicU32,
}

impl MockProvider {
    #[must_use]
    pub fn new(name: impl Into<String>, supports_web_search: bool) -> Self {
        Self {
            name: name.into(),
            supports_web_search,
            fixed_response: Mutex::new("mock response".to_owned()),
            fail_next: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            call_count: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_fixed_response(self, text: impl Into<String>) -> Self {
        *self.fixed_response.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = text.into();
        self
    }

    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_web_search(&self) -> bool {
        self.supports_web_search
    }

    async fn chat(&self, request: &ChatRequest, model: &str) -> Result<ChatResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Unavailable { provider: self.name.clone() });
        }

        let content = self.fixed_response.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone();
        let input = u32::try_from(request.content.len() / 4).unwrap_or(u32::MAX).max(1);
        let output = u32::try_from(content.len() / 4).unwrap_or(u32::MAX).max(1);

        Ok(ChatResponse {
            id: request.id.clone(),
            content,
            provider: self.name.clone(),
            model: model.to_owned(),
            tokens: TokenUsage { input, output, total: input + output },
            cost: self.estimate_cost(input, output, model),
            response_time_ms: 10,
            citations: Vec::new(),
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn available_models(&self) -> Vec<String> {
        vec!["mock-model".to_owned()]
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, _model: &str) -> f64 {
        f64::from(input_tokens) * 0.000_001 + f64::from(output_tokens) * 0.000_002
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
