//! Pure query classification
//!
//! Classifies raw query text into a [`ClassifiedQuery`] by scalar complexity
//! score, primary intent, and a real-time flag, using token-count binning
//! and keyword/pattern matching. No I/O, no ML pipeline — pure heuristics,
//! in the spirit of the gateway's own `synapse-routing::analysis` module,
//! generalized to the full complexity/intent taxonomy this spec requires.

#![allow(clippy::must_use_candidate)]

mod keywords;

use std::collections::BTreeSet;
use std::time::Duration;

/// Derived difficulty band of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Primary intent behind a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Search,
    Reasoning,
    Chat,
    Creative,
    Code,
}

/// Configurable classifier thresholds
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Complexity score at or below which a query is `Simple`
    pub simple_threshold: f64,
    /// Complexity score at or below which a query is `Medium` (else `Complex`)
    pub medium_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            simple_threshold: 0.30,
            medium_threshold: 0.70,
        }
    }
}

/// Immutable classification result for one query
#[derive(Debug, Clone)]
pub struct ClassifiedQuery {
    pub text: String,
    pub complexity: Complexity,
    /// Raw complexity score, clamped to `[0, 1]`
    pub complexity_score: f64,
    pub intent: Intent,
    pub is_realtime: bool,
    pub estimated_tokens: u32,
    /// Keyword/pattern indicators that contributed to this classification
    pub matched_indicators: BTreeSet<String>,
}

/// Estimate token count as `ceil(len(text) / 4)`
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    let len = text.chars().count();
    u32::try_from(len.div_ceil(4)).unwrap_or(u32::MAX)
}

/// Classify a raw query. Pure; identical input always produces identical output.
#[must_use]
pub fn classify_query(text: &str, config: &ClassifierConfig) -> ClassifiedQuery {
    let lower = text.to_lowercase();
    let estimated_tokens = estimate_tokens(text);

    let mut matched = BTreeSet::new();
    let complexity_score = score_complexity(&lower, text, estimated_tokens, &mut matched);
    let complexity = if complexity_score <= config.simple_threshold {
        Complexity::Simple
    } else if complexity_score <= config.medium_threshold {
        Complexity::Medium
    } else {
        Complexity::Complex
    };

    let is_realtime = keywords::REALTIME.iter().any(|k| lower.contains(k));
    if is_realtime {
        matched.insert("realtime".to_owned());
    }

    let intent = select_intent(&lower, text, is_realtime, &mut matched);

    ClassifiedQuery {
        text: text.to_owned(),
        complexity,
        complexity_score,
        intent,
        is_realtime,
        estimated_tokens,
        matched_indicators: matched,
    }
}

/// `shouldSkipCache(q)` = `q.isRealtime OR q.intent = creative`
#[must_use]
pub fn should_skip_cache(query: &ClassifiedQuery) -> bool {
    query.is_realtime || query.intent == Intent::Creative
}

/// Suggested cache TTL for a classified query
#[must_use]
pub fn suggest_cache_ttl(query: &ClassifiedQuery) -> Duration {
    if query.is_realtime {
        Duration::from_secs(5 * 60)
    } else if query.intent == Intent::Search {
        Duration::from_secs(30 * 60)
    } else {
        Duration::from_secs(60 * 60)
    }
}

/// Weighted, diminishing-returns keyword scan
///
/// The first match in a keyword list contributes full weight; each
/// subsequent match contributes 30% of the weight, so a query stuffed
/// with synonyms doesn't dominate the score.
fn diminishing_score(lower: &str, keywords: &[&str], weight: f64, matched: &mut BTreeSet<String>) -> f64 {
    let mut total = 0.0;
    let mut hits = 0;
    for kw in keywords {
        if lower.contains(kw) {
            matched.insert((*kw).to_owned());
            let factor = if hits == 0 { 1.0 } else { 0.3 };
            total += weight * factor;
            hits += 1;
        }
    }
    total
}

fn length_term(tokens: u32) -> f64 {
    match tokens {
        0..=20 => 0.0,
        21..=50 => 0.10,
        51..=150 => 0.20,
        151..=400 => 0.35,
        401..=800 => 0.50,
        _ => 0.65,
    }
}

fn score_complexity(lower: &str, original: &str, tokens: u32, matched: &mut BTreeSet<String>) -> f64 {
    let mut score = length_term(tokens);

    score += diminishing_score(lower, keywords::COMPLEX, 0.35, matched);
    score += diminishing_score(lower, keywords::MEDIUM, 0.15, matched);
    score -= diminishing_score(lower, keywords::SIMPLE_NEGATIVE, 0.20, matched);

    let sentence_count = original.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    if sentence_count > 1 {
        score += 0.05;
        matched.insert("multi_sentence".to_owned());
    }

    let question_marks = original.chars().filter(|&c| c == '?').count();
    if question_marks >= 2 {
        score += 0.05;
        matched.insert("multi_question".to_owned());
    }

    if original.contains("\n- ") || original.contains("\n* ") || has_numbered_list(original) {
        score += 0.05;
        matched.insert("list_markers".to_owned());
    }

    score.clamp(0.0, 1.0)
}

fn has_numbered_list(text: &str) -> bool {
    text.lines()
        .any(|line| {
            let trimmed = line.trim_start();
            let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
            !digits.is_empty() && trimmed[digits.len()..].starts_with(". ")
        })
}

fn select_intent(lower: &str, original: &str, is_realtime: bool, matched: &mut BTreeSet<String>) -> Intent {
    let mut search = diminishing_score(lower, keywords::SEARCH, 0.4, matched);
    let reasoning = diminishing_score(lower, keywords::REASONING, 0.4, matched);
    let creative = diminishing_score(lower, keywords::CREATIVE, 0.4, matched);
    let code = diminishing_score(lower, keywords::CODE, 0.4, matched);
    let mut chat = 0.15;

    if original.chars().count() <= 40 {
        chat += 0.20;
        matched.insert("short_message".to_owned());
    }

    if is_realtime {
        search += 0.6;
    }

    let scored = [
        (Intent::Search, search),
        (Intent::Reasoning, reasoning),
        (Intent::Chat, chat),
        (Intent::Creative, creative),
        (Intent::Code, code),
    ];

    scored
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(Intent::Chat, |(intent, _)| intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_tokens_as_quarter_length_ceiling() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn pure_identical_inputs_produce_identical_outputs() {
        let a = classify_query("What is the capital of France?", &ClassifierConfig::default());
        let b = classify_query("What is the capital of France?", &ClassifierConfig::default());
        assert_eq!(a.complexity, b.complexity);
        assert!((a.complexity_score - b.complexity_score).abs() < f64::EPSILON);
        assert_eq!(a.intent, b.intent);
    }

    #[test]
    fn bitcoin_price_is_simple_search_realtime() {
        let q = classify_query("What is the current Bitcoin price?", &ClassifierConfig::default());
        assert_eq!(q.complexity, Complexity::Simple);
        assert_eq!(q.intent, Intent::Search);
        assert!(q.is_realtime);
        assert!(should_skip_cache(&q));
    }

    #[test]
    fn poem_is_creative_and_skips_cache() {
        let q = classify_query("Write a poem about the ocean at sunset", &ClassifierConfig::default());
        assert_eq!(q.intent, Intent::Creative);
        assert!(should_skip_cache(&q));
    }

    #[test]
    fn long_architecture_question_is_complex() {
        let text = "Design a distributed system architecture for a multi-region, \
                     highly available payment processor. Explain the trade-offs \
                     between consistency and availability, and prove that your \
                     design tolerates a single region outage. What is the \
                     computational complexity of the reconciliation algorithm? \
                     Provide a comprehensive analysis.";
        let q = classify_query(text, &ClassifierConfig::default());
        assert_eq!(q.complexity, Complexity::Complex);
    }

    #[test]
    fn cache_ttl_by_intent() {
        let realtime = classify_query("what's happening right now", &ClassifierConfig::default());
        assert_eq!(suggest_cache_ttl(&realtime), Duration::from_secs(300));

        let search = classify_query("find recent papers on protein folding", &ClassifierConfig::default());
        if search.is_realtime {
            assert_eq!(suggest_cache_ttl(&search), Duration::from_secs(300));
        } else if search.intent == Intent::Search {
            assert_eq!(suggest_cache_ttl(&search), Duration::from_secs(1800));
        }

        let chat = classify_query("hello there", &ClassifierConfig::default());
        assert_eq!(suggest_cache_ttl(&chat), Duration::from_secs(3600));
    }
}
