//! Cascade execution: try each step, escalate past quality shortfalls
//!
//! Mirrors the gateway's `synapse-routing::strategy::cascade::should_escalate`
//! loop: call the step, score the result, stop as soon as a step clears its
//! own quality threshold, otherwise keep the best-scoring attempt seen so far
//! and surface it if every step is exhausted.

use cascadeflow_classifier::ClassifiedQuery;
use cascadeflow_provider::retry::call_with_deadline;
use cascadeflow_provider::{ChatRequest, ChatResponse, Provider, ProviderError};
use cascadeflow_quality::{Citation, QualityReport, ResponseMeta, assess};

use crate::decision::CascadeStep;
use crate::error::RoutingError;

/// One attempted cascade step: the raw response plus its quality assessment
#[derive(Debug, Clone)]
pub struct CascadeAttempt {
    pub step_index: usize,
    pub response: ChatResponse,
    pub quality: QualityReport,
}

/// Outcome of running a full cascade chain
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    /// The attempt returned to the caller: the first to clear its threshold,
    /// or the highest-scoring attempt if none did
    pub winner: CascadeAttempt,
    /// Every attempt made, in step order, including ones that were escalated past
    pub attempts: Vec<CascadeAttempt>,
    /// True when `winner` did not itself clear its step's quality threshold
    pub escalated: bool,
}

/// Run `chain` against `provider_for` (a lookup from provider name to a
/// `Provider` trait object), stopping at the first step whose response
/// clears its own quality threshold.
///
/// `on_step` is called once per successfully-scored step, in order, with
/// `(provider, model, score, index)` — the live per-step signal spec §4.7
/// calls for, fired as each step completes rather than reconstructed
/// after the whole chain finishes.
///
/// Returns [`RoutingError::AllCascadeStepsFailed`] only when every step
/// errors out; a step that merely scores below threshold is not a failure,
/// it is recorded as an attempt and the chain moves on.
pub async fn run_cascade<'a, F, S>(
    chain: &[CascadeStep],
    query: &ClassifiedQuery,
    provider_for: F,
    mut on_step: S,
) -> Result<CascadeOutcome, RoutingError>
where
    F: Fn(&str) -> Option<&'a dyn Provider>,
    S: FnMut(&str, &str, f64, usize),
{
    let mut attempts = Vec::with_capacity(chain.len());
    let mut best: Option<usize> = None;

    for (index, step) in chain.iter().enumerate() {
        let Some(provider) = provider_for(&step.provider) else {
            continue;
        };

        let request = ChatRequest {
            id: format!("cascade-{index}"),
            content: query.text.clone(),
            system_prompt: None,
            conversation_history: Vec::new(),
            max_tokens: None,
            temperature: None,
        };

        let response: Result<ChatResponse, ProviderError> =
            call_with_deadline(&step.provider, &step.model, step.reasoning, || provider.chat(&request, &step.model)).await;
        let Ok(response) = response else {
            continue;
        };

        let citations: Vec<Citation> = response
            .citations
            .iter()
            .map(|c| Citation { hostname: c.hostname.clone() })
            .collect();

        let meta = ResponseMeta {
            text: &response.content,
            provider: &response.provider,
            is_search_provider: provider.supports_web_search(),
            citations: &citations,
            latency_ms: Some(response.response_time_ms),
            input_tokens: Some(response.tokens.input),
            output_tokens: Some(response.tokens.output),
        };

        let attempt = CascadeAttempt {
            step_index: index,
            quality: assess(&meta, query),
            response,
        };

        on_step(&attempt.response.provider, &attempt.response.model, attempt.quality.overall_score, index);

        let cleared = attempt.quality.overall_score >= step.quality_threshold;
        let attempt_score = attempt.quality.overall_score;
        attempts.push(attempt);

        if cleared {
            let winner = attempts.pop().expect("just pushed");
            return Ok(CascadeOutcome {
                winner,
                attempts,
                escalated: false,
            });
        }

        best = match best {
            Some(i) if attempts[i].quality.overall_score >= attempt_score => Some(i),
            _ => Some(attempts.len() - 1),
        };
    }

    let best_index = best.ok_or(RoutingError::AllCascadeStepsFailed)?;
    let winner = attempts[best_index].clone();
    Ok(CascadeOutcome {
        winner,
        attempts,
        escalated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_classifier::{ClassifierConfig, classify_query};
    use cascadeflow_provider::mock::MockProvider;

    fn step(provider: &str, model: &str, threshold: f64) -> CascadeStep {
        CascadeStep {
            provider: provider.to_owned(),
            model: model.to_owned(),
            quality_threshold: threshold,
            max_cost: 0.01,
            reasoning: false,
        }
    }

    fn query(text: &str) -> ClassifiedQuery {
        classify_query(text, &ClassifierConfig::default())
    }

    #[tokio::test]
    async fn stops_at_first_step_clearing_its_threshold() {
        let weak = MockProvider::new("perplexity", true).with_fixed_response("short.");
        let strong = MockProvider::new("openai", false).with_fixed_response(
            "# Detailed Answer\n\nHere is a thorough, well-cited explanation with a clear structure. \
             The answer is certainly complete.\n\n1. First point\n2. Second point\n\nThis response is confident.",
        );

        let chain = vec![step("perplexity", "sonar", 9.9), step("openai", "gpt-4o", 5.0)];
        let q = query("explain the thing in detail, step by step, and justify every claim you make");
        let mut observed = Vec::new();
        let outcome = run_cascade(
            &chain,
            &q,
            |name| match name {
                "perplexity" => Some(&weak as &dyn Provider),
                "openai" => Some(&strong as &dyn Provider),
                _ => None,
            },
            |provider, _model, score, index| observed.push((provider.to_owned(), score, index)),
        )
        .await
        .expect("chain should produce an outcome");

        assert_eq!(outcome.winner.step_index, 1);
        assert!(outcome.escalated);
        assert_eq!(outcome.attempts.len(), 1, "escalated past step should not be in attempts");
        assert_eq!(observed.len(), 2, "on_step fires once per scored attempt");
        assert_eq!(observed[0].0, "perplexity");
        assert_eq!(observed[1].0, "openai");
    }

    #[tokio::test]
    async fn all_steps_failing_is_reported() {
        let dead = MockProvider::new("openai", false);
        dead.fail_next_call();

        let chain = vec![step("openai", "gpt-4o", 1.0)];
        let q = query("q");
        let err = run_cascade(&chain, &q, |_| Some(&dead as &dyn Provider), |_, _, _, _| {})
            .await
            .expect_err("single failing provider should exhaust the chain");
        assert!(matches!(err, RoutingError::AllCascadeStepsFailed));
    }

    #[tokio::test]
    async fn unreachable_provider_name_is_skipped_not_fatal() {
        let strong = MockProvider::new("openai", false).with_fixed_response("a confident, complete, well-structured answer.");
        let chain = vec![step("nonexistent", "x", 1.0), step("openai", "gpt-4o", 1.0)];
        let q = query("q");
        let outcome = run_cascade(
            &chain,
            &q,
            |name| (name == "openai").then_some(&strong as &dyn Provider),
            |_, _, _, _| {},
        )
        .await
        .expect("second step should still run");
        assert_eq!(outcome.winner.step_index, 1);
    }
}
