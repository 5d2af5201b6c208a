use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::competition::models::Competition;
use crate::jobs::run_auto_approval_cycle;
use crate::prize::PrizeService;
use crate::shared::{AppError, AppState};

/// Routes: a health probe, read access to one competition, and one
/// parameterless trigger per scheduled job so an external cron-style invoker
/// can drive the cycles directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/competitions/:competition_id", get(get_competition))
        .route("/jobs/auto-approval", post(trigger_auto_approval))
        .route("/jobs/prize-distribution", post(trigger_prize_distribution))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> Result<Json<Competition>, AppError> {
    let competition = state
        .competitions
        .get_competition(&competition_id)
        .await?
        .ok_or(AppError::NotFound(competition_id))?;
    Ok(Json(competition))
}

async fn trigger_auto_approval(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let approved = run_auto_approval_cycle(
        &state.competitions,
        &state.notifier,
        state.auto_approval.approval_timeout,
        Utc::now(),
    )
    .await?;
    Ok(Json(json!({ "approved": approved })))
}

async fn trigger_prize_distribution(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let service = PrizeService::new(
        state.competitions.clone(),
        state.users.clone(),
        state.notifier.clone(),
    );
    let settled = service.settle_due_competitions(Utc::now()).await?;
    Ok(Json(json!({ "settled": settled })))
}
