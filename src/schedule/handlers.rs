use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::instrument;

use super::dto::{AddEntryRequest, AssignSlotsRequest, BoardResponse, DosageRequest, MoveEntryRequest};
use super::model::ScheduledSupplement;
use super::services::{self, ToggleOutcome};
use crate::{auth::services::AuthUser, error::AppResult, state::AppState};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(get_board).post(add_entry))
        .route("/schedule/:id", delete(remove_entry))
        .route("/schedule/:id/slot", patch(move_entry))
        .route("/schedule/:id/dosage", patch(update_dosage))
        .route("/schedule/:id/toggle", post(toggle_intake))
        .route("/schedule/supplements/:supplement_id/slots", put(assign_slots))
}

/// Calendar day the intake belongs to.
fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state))]
pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<BoardResponse>> {
    let board = services::load_board(state.schedule.as_ref(), user_id, today()).await?;
    Ok(Json(BoardResponse::from(&board)))
}

#[instrument(skip(state))]
pub async fn add_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddEntryRequest>,
) -> AppResult<(StatusCode, Json<ScheduledSupplement>)> {
    let entry = services::add_to_slot(
        state.schedule.as_ref(),
        user_id,
        today(),
        body.supplement_id,
        body.time_slot,
        body.dosage,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    services::remove_entry(state.schedule.as_ref(), user_id, today(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn move_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<MoveEntryRequest>,
) -> AppResult<Json<BoardResponse>> {
    let board = services::move_entry(
        state.schedule.as_ref(),
        user_id,
        today(),
        id,
        body.time_slot,
        body.index,
    )
    .await?;
    Ok(Json(BoardResponse::from(&board)))
}

#[instrument(skip(state))]
pub async fn update_dosage(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<DosageRequest>,
) -> AppResult<Json<ScheduledSupplement>> {
    let entry =
        services::update_dosage(state.schedule.as_ref(), user_id, today(), id, body.dosage).await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn assign_slots(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(supplement_id): Path<i64>,
    Json(body): Json<AssignSlotsRequest>,
) -> AppResult<Json<Vec<ScheduledSupplement>>> {
    let entries = services::assign_slots(
        state.schedule.as_ref(),
        user_id,
        supplement_id,
        body.slots,
        body.dosage,
    )
    .await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn toggle_intake(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ToggleOutcome>> {
    let outcome = services::toggle_intake(state.schedule.as_ref(), user_id, today(), id).await?;
    Ok(Json(outcome))
}
