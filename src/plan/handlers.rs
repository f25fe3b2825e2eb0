use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{AddToPlanRequest, DoseCountdown, PlanSummary};
use super::{repo, services};
use crate::{
    auth::services::AuthUser,
    catalog::repo::{self as catalog_repo, Supplement},
    error::AppResult,
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plan", get(list_plan).post(add_to_plan))
        .route("/plan/summary", get(get_summary))
        .route("/plan/:supplement_id", delete(remove_from_plan))
        .route("/plan/:supplement_id/doses", get(get_doses))
}

#[instrument(skip(state))]
pub async fn list_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Supplement>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn add_to_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddToPlanRequest>,
) -> AppResult<(StatusCode, Json<Supplement>)> {
    let found = catalog_repo::find(&state.db, body.supplement_id).await?;
    let supplement = services::require_in_catalog(found, body.supplement_id)?;
    services::check_added(repo::add(&state.db, user_id, supplement.id).await?)?;
    info!(%user_id, supplement_id = supplement.id, "added to plan");
    Ok((StatusCode::CREATED, Json(supplement)))
}

#[instrument(skip(state))]
pub async fn remove_from_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(supplement_id): Path<i64>,
) -> AppResult<StatusCode> {
    let rows = repo::remove(&state.db, user_id, supplement_id).await?;
    services::check_removed(rows, supplement_id)?;
    info!(%user_id, supplement_id, "removed from plan");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PlanSummary>> {
    let plan = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(services::summarize(&plan)))
}

#[instrument(skip(state))]
pub async fn get_doses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(supplement_id): Path<i64>,
) -> AppResult<Json<DoseCountdown>> {
    let found = repo::find_in_plan(&state.db, user_id, supplement_id).await?;
    let supplement = services::require_in_plan(found, supplement_id)?;
    let dosage = repo::scheduled_dosage(&state.db, user_id, supplement_id)
        .await?
        .unwrap_or_else(|| supplement.dosage.clone());
    let taken = repo::taken_count(&state.db, user_id, supplement_id).await?;

    Ok(Json(services::dose_countdown(
        &supplement,
        &dosage,
        taken.max(0) as u64,
    )))
}
