//! Routing decision types shared across strategies and the cascade executor

/// Which strategy produced a [`RoutingDecision`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Priority,
    CostOptimized,
    Cascade,
    Emergency,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::CostOptimized => "cost-optimized",
            Self::Cascade => "cascade",
            Self::Emergency => "emergency",
        }
    }
}

/// One provider/model tier in a cascade chain
#[derive(Debug, Clone)]
pub struct CascadeStep {
    pub provider: String,
    pub model: String,
    pub quality_threshold: f64,
    pub max_cost: f64,
    /// Whether this step's model carries the `Reasoning` capability, which
    /// gets it the longer per-call deadline (spec §5: 120s vs 60s)
    pub reasoning: bool,
}

/// Immutable routing outcome for one request
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub provider: String,
    pub model: String,
    pub strategy: StrategyKind,
    pub reason: String,
    pub estimated_cost: f64,
    /// Non-empty ordered sequence when `strategy == Cascade`
    pub cascade_chain: Option<Vec<CascadeStep>>,
    pub emergency_mode: bool,
    /// Whether the selected model carries the `Reasoning` capability
    pub reasoning: bool,
}
