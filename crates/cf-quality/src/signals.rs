//! Per-signal scoring functions backing [`super::assess`]

use cascadeflow_classifier::{ClassifiedQuery, Complexity};

use crate::{ResponseMeta, intent_requires_code};

/// A source citation attached to a response
#[derive(Debug, Clone)]
pub struct Citation {
    pub hostname: String,
}

const REFUSAL_PATTERNS: &[&str] = &[
    "i cannot help with that",
    "i can't help with that",
    "i cannot assist with",
    "i'm not able to help",
    "i won't be able to",
];

const HIGH_CONFIDENCE_PATTERNS: &[&str] = &[
    "definitely", "certainly", "the answer is", "clearly", "without a doubt",
    "confirmed", "precisely",
];

const LOW_CONFIDENCE_PATTERNS: &[&str] = &[
    "i'm not sure", "i don't know", "i'm uncertain", "it's unclear",
    "i cannot determine", "i can't determine", "i may be wrong", "this might not be",
    "possibly", "perhaps",
];

pub(crate) fn citation_quality(response: &ResponseMeta<'_>) -> f64 {
    let count = response.citations.len();
    let mut score: f64 = match count {
        0 if response.is_search_provider => 3.0,
        0 => 6.0,
        1 => 6.0,
        2..=5 => 9.0,
        6..=8 => 7.5,
        _ => 6.0,
    };

    if count > 0 {
        let distinct: usize = response
            .citations
            .iter()
            .map(|c| c.hostname.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        if distinct >= count.min(3) {
            score += 0.5;
        }
    }

    score.min(10.0)
}

pub(crate) fn confidence_language(text: &str) -> f64 {
    let lower = text.to_lowercase();

    if REFUSAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return 1.0;
    }

    let high = HIGH_CONFIDENCE_PATTERNS.iter().filter(|p| lower.contains(*p)).count();
    let low = LOW_CONFIDENCE_PATTERNS.iter().filter(|p| lower.contains(*p)).count();

    let adjustment = (0.5 * (high as f64 - 2.0 * low as f64)).clamp(-5.0, 3.0);
    (7.0 + adjustment).clamp(0.0, 10.0)
}

fn complexity_scale(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 0.6,
        Complexity::Medium => 1.0,
        Complexity::Complex => 1.4,
    }
}

pub(crate) fn structural_completeness(text: &str, query: &ClassifiedQuery) -> f64 {
    let scale = complexity_scale(query.complexity);
    let mut score = 5.0;

    let has_heading = text.lines().any(|l| l.trim_start().starts_with('#'));
    let has_list = text
        .lines()
        .any(|l| {
            let trimmed = l.trim_start();
            trimmed.starts_with("- ") || trimmed.starts_with("* ") || starts_with_numbered_marker(trimmed)
        });
    let has_code_block = text.contains("```");
    let has_bold = text.contains("**");
    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();

    if has_heading {
        score += 1.0 * scale;
    }
    if has_list {
        score += 1.0 * scale;
    }
    if has_code_block {
        score += 1.5 * scale;
    }
    if has_bold {
        score += 0.5 * scale;
    }
    if paragraph_count >= 2 {
        score += 1.0 * scale;
    }

    if intent_requires_code(query.intent) && !has_code_block {
        score -= 2.0;
    }

    score.clamp(0.0, 10.0)
}

fn starts_with_numbered_marker(trimmed: &str) -> bool {
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    !digits.is_empty() && trimmed[digits.len()..].starts_with(". ")
}

struct LengthBand {
    low: f64,
    high: f64,
    ideal: f64,
}

fn length_band(complexity: Complexity) -> LengthBand {
    match complexity {
        Complexity::Simple => LengthBand { low: 50.0, high: 500.0, ideal: 200.0 },
        Complexity::Medium => LengthBand { low: 150.0, high: 1500.0, ideal: 600.0 },
        Complexity::Complex => LengthBand { low: 300.0, high: 4000.0, ideal: 1500.0 },
    }
}

pub(crate) fn length_appropriateness(output_tokens: Option<u32>, complexity: Complexity) -> f64 {
    let Some(out) = output_tokens else { return 5.0 };
    let out = f64::from(out);
    let band = length_band(complexity);

    if out < band.low {
        let ratio = out / band.low;
        (ratio * 7.0).max(2.0)
    } else if out > band.high {
        let over_ratio = out / band.high;
        (10.0 - 3.0 * (over_ratio - 1.0)).max(4.0)
    } else {
        (10.0 - 3.0 * (out - band.ideal).abs() / band.ideal).max(7.0)
    }
}

fn latency_baseline(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 2000.0,
        Complexity::Medium => 5000.0,
        Complexity::Complex => 10000.0,
    }
}

pub(crate) fn latency_vs_expected(latency_ms: Option<u64>, complexity: Complexity) -> f64 {
    let Some(latency) = latency_ms else { return 7.0 };
    let ratio = latency as f64 / latency_baseline(complexity);

    if ratio <= 0.5 {
        10.0
    } else if ratio <= 1.0 {
        9.0
    } else if ratio <= 2.0 {
        6.0
    } else {
        3.0
    }
}

pub(crate) fn token_efficiency(input_tokens: Option<u32>, output_tokens: Option<u32>) -> f64 {
    let (Some(input), Some(output)) = (input_tokens, output_tokens) else {
        return 5.0;
    };
    if input == 0 {
        return 5.0;
    }
    let ratio = f64::from(output) / f64::from(input);

    if ratio < 0.5 {
        4.0
    } else if ratio <= 5.0 {
        9.0
    } else if ratio <= 10.0 {
        7.0
    } else {
        5.0
    }
}
