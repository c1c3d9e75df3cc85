use axum::Json;
use axum::extract::State;
use cascadeflow_budget::Period;
use serde_json::{Value, json};

use crate::dto::BudgetStatusDto;
use crate::state::AppState;

pub async fn budget_handler(State(state): State<AppState>) -> Json<Value> {
    let budget = state.orchestrator.budget();
    let daily = BudgetStatusDto::from(budget.get_status(Period::Daily));
    let weekly = BudgetStatusDto::from(budget.get_status(Period::Weekly));
    let monthly = BudgetStatusDto::from(budget.get_status(Period::Monthly));
    let by_provider = budget.breakdown(Period::Daily);

    Json(json!({
        "statuses": { "daily": daily, "weekly": weekly, "monthly": monthly },
        "emergencyMode": budget.is_emergency_mode_active(),
        "byProvider": by_provider,
        // The tracker logs spend per provider, not per model; there is no
        // per-model breakdown to report yet.
        "byModel": {},
    }))
}
