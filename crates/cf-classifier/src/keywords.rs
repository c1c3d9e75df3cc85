//! Keyword lists driving the diminishing-returns scoring in [`super`]
//!
//! Plain `&str` slices, matched by substring on lowercased text. Kept as
//! flat lists rather than a config file: these are classification
//! heuristics, not operator-tunable policy.

pub const REALTIME: &[&str] = &[
    "current", "currently", "right now", "today", "latest", "live",
    "at the moment", "this week", "this month", "now playing",
    "real-time", "real time", "breaking",
];

pub const COMPLEX: &[&str] = &[
    "architecture", "distributed system", "prove", "proof", "trade-off",
    "trade-offs", "tradeoffs", "comprehensive analysis", "reconciliation",
    "computational complexity", "design a system", "multi-region",
    "highly available", "formal verification", "optimize for scale",
    "derive", "theorem",
];

pub const MEDIUM: &[&str] = &[
    "compare", "explain", "how does", "why does", "summarize",
    "analyze", "what are the differences", "pros and cons",
    "walk me through", "describe",
];

pub const SIMPLE_NEGATIVE: &[&str] = &[
    "hi", "hello", "hey", "thanks", "thank you", "yes", "no", "ok",
    "what is", "who is", "when is", "where is",
];

pub const SEARCH: &[&str] = &[
    "price", "news", "weather", "score", "stock", "search for",
    "find", "look up", "recent papers", "latest on",
];

pub const REASONING: &[&str] = &[
    "prove", "theorem", "derive", "solve for", "step by step",
    "logical", "deduce", "calculate", "computational complexity",
];

pub const CREATIVE: &[&str] = &[
    "write a poem", "write a story", "poem about", "short story",
    "write a song", "compose", "creative writing", "brainstorm names",
    "write a haiku",
];

pub const CODE: &[&str] = &[
    "function", "refactor", "debug", "write a program", "implement",
    "algorithm", "code review", "unit test", "stack trace", "compile error",
    "regex for",
];
