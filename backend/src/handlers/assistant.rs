//! HTTP handlers for the LLM assistant endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::assistant::{AssistantAnswer, AssistantService};
use crate::AppState;

/// Natural-language query payload
#[derive(Debug, Deserialize)]
pub struct AssistantQueryBody {
    pub query: String,
}

/// Answer a natural-language question about the business data
pub async fn assistant_query(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(body): Json<AssistantQueryBody>,
) -> AppResult<Json<AssistantAnswer>> {
    let service = AssistantService::new(state.db, state.report_cache, &state.config);
    let answer = service.query(&body.query).await?;
    Ok(Json(answer))
}

/// Narrative insights over the last 30 days
pub async fn assistant_insights(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Value>> {
    let service = AssistantService::new(state.db, state.report_cache, &state.config);
    let insights = service.insights().await?;
    Ok(Json(json!({ "insights": insights })))
}
