//! Pure six-signal response quality scoring
//!
//! A spiritual descendant of the gateway's `synapse-routing::strategy::cascade`
//! confidence heuristic (hedging-phrase detection, short-response penalty),
//! generalized from one scalar "should we escalate" signal into six weighted
//! signals and a structured report.

#![allow(clippy::must_use_candidate)]

mod signals;

use cascadeflow_classifier::{ClassifiedQuery, Complexity, Intent};

pub use signals::Citation;

/// Input to [`assess`]: the response fields the signals need, not the full wire type
#[derive(Debug, Clone)]
pub struct ResponseMeta<'a> {
    pub text: &'a str,
    pub provider: &'a str,
    pub is_search_provider: bool,
    pub citations: &'a [Citation],
    pub latency_ms: Option<u64>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// Letter grade derived from `overall_score`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

/// What the router should do next given this quality report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Accept,
    Escalate,
    Reject,
}

/// Raw per-signal scores, each in `[0, 10]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScores {
    pub citation_quality: f64,
    pub confidence_language: f64,
    pub structural_completeness: f64,
    pub length_appropriateness: f64,
    pub latency_vs_expected: f64,
    pub token_efficiency: f64,
}

impl SignalScores {
    fn as_array(self) -> [f64; 6] {
        [
            self.citation_quality,
            self.confidence_language,
            self.structural_completeness,
            self.length_appropriateness,
            self.latency_vs_expected,
            self.token_efficiency,
        ]
    }
}

const WEIGHTS: SignalScores = SignalScores {
    citation_quality: 0.25,
    confidence_language: 0.20,
    structural_completeness: 0.20,
    length_appropriateness: 0.15,
    latency_vs_expected: 0.10,
    token_efficiency: 0.10,
};

/// Full quality assessment for one response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    pub signals: SignalScores,
    pub overall_score: f64,
    pub confidence: f64,
    pub grade: Grade,
    pub recommendation: Recommendation,
}

/// Score a response against the query that produced it. Pure.
pub fn assess(response: &ResponseMeta<'_>, query: &ClassifiedQuery) -> QualityReport {
    let signals = SignalScores {
        citation_quality: signals::citation_quality(response),
        confidence_language: signals::confidence_language(response.text),
        structural_completeness: signals::structural_completeness(response.text, query),
        length_appropriateness: signals::length_appropriateness(response.output_tokens, query.complexity),
        latency_vs_expected: signals::latency_vs_expected(response.latency_ms, query.complexity),
        token_efficiency: signals::token_efficiency(response.input_tokens, response.output_tokens),
    };

    let weighted = signals.as_array();
    let weights = WEIGHTS.as_array();
    let overall_score: f64 = weighted.iter().zip(weights).map(|(s, w)| s * w).sum();

    let mean = weighted.iter().sum::<f64>() / weighted.len() as f64;
    let variance = weighted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / weighted.len() as f64;
    let confidence = (1.0 - variance.sqrt() / 5.0).clamp(0.2, 1.0);

    let grade = if overall_score >= 8.5 {
        Grade::A
    } else if overall_score >= 7.0 {
        Grade::B
    } else if overall_score >= 5.0 {
        Grade::C
    } else if overall_score >= 3.0 {
        Grade::D
    } else {
        Grade::F
    };

    let (accept_at, reject_below) = match query.complexity {
        Complexity::Simple => (6.0, 3.0),
        Complexity::Medium => (7.0, 4.0),
        Complexity::Complex => (8.0, 5.0),
    };
    let recommendation = if overall_score >= accept_at {
        Recommendation::Accept
    } else if overall_score < reject_below {
        Recommendation::Reject
    } else {
        Recommendation::Escalate
    };

    QualityReport {
        signals,
        overall_score,
        confidence,
        grade,
        recommendation,
    }
}

pub(crate) fn intent_requires_code(intent: Intent) -> bool {
    intent == Intent::Code
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_classifier::{ClassifierConfig, classify_query};

    #[test]
    fn confident_well_structured_response_is_accepted() {
        let query = classify_query("Explain how binary search works", &ClassifierConfig::default());
        let text = "## Binary search\n\nBinary search repeatedly halves the search range. \
                     The answer is that it runs in O(log n) time.\n\nIt is definitely optimal \
                     for sorted arrays.";
        let response = ResponseMeta {
            text,
            provider: "anthropic",
            is_search_provider: false,
            citations: &[],
            latency_ms: Some(1500),
            input_tokens: Some(50),
            output_tokens: Some(180),
        };
        let report = assess(&response, &query);
        assert!(report.overall_score > 0.0);
        assert_ne!(report.recommendation, Recommendation::Reject);
    }

    #[test]
    fn refusal_language_tanks_confidence_signal() {
        let query = classify_query("What is the capital of France?", &ClassifierConfig::default());
        let response = ResponseMeta {
            text: "I cannot help with that request.",
            provider: "anthropic",
            is_search_provider: false,
            citations: &[],
            latency_ms: Some(500),
            input_tokens: Some(10),
            output_tokens: Some(8),
        };
        let report = assess(&response, &query);
        assert_eq!(report.signals.confidence_language, 1.0);
    }

    #[test]
    fn empty_response_to_code_intent_is_penalized_for_missing_code_block() {
        let query = classify_query("Implement a function to reverse a string", &ClassifierConfig::default());
        let response = ResponseMeta {
            text: "You should reverse the string somehow.",
            provider: "openai",
            is_search_provider: false,
            citations: &[],
            latency_ms: Some(1000),
            input_tokens: Some(20),
            output_tokens: Some(10),
        };
        let report = assess(&response, &query);
        assert!(report.signals.structural_completeness < 5.0);
    }
}
