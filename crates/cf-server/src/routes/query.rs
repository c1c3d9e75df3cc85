use axum::Json;
use axum::extract::State;
use cascadeflow_orchestrator::QueryRequest;
use cascadeflow_provider::Message;
use cascadeflow_routing::StrategyOverride;
use serde::Deserialize;

use crate::dto::QueryResponseDto;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequestBody {
    pub content: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub conversation_history: Vec<MessageBody>,
    #[serde(default)]
    pub strategy: Option<StrategyOverrideBody>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyOverrideBody {
    Priority,
    CostOptimized,
    Cascade,
}

impl From<StrategyOverrideBody> for StrategyOverride {
    fn from(b: StrategyOverrideBody) -> Self {
        match b {
            StrategyOverrideBody::Priority => Self::Priority,
            StrategyOverrideBody::CostOptimized => Self::CostOptimized,
            StrategyOverrideBody::Cascade => Self::Cascade,
        }
    }
}

pub async fn query_handler(State(state): State<AppState>, Json(body): Json<QueryRequestBody>) -> Result<Json<QueryResponseDto>, ApiError> {
    let request = QueryRequest {
        content: body.content,
        strategy_override: body.strategy.map(StrategyOverride::from),
        system_prompt: body.system_prompt,
        max_tokens: body.max_tokens,
        temperature: body.temperature,
        conversation_history: body
            .conversation_history
            .into_iter()
            .map(|m| Message { role: m.role, content: m.content })
            .collect(),
    };

    let result = state.orchestrator.process_query(request).await?;
    Ok(Json(QueryResponseDto::from(&result)))
}
