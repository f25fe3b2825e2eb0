use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::{
    GoalsRequest, NameRequest, PreferencesRequest, ProfileResponse, RecordWeightRequest,
    Settings, WaterGoalRequest, WeightHistory,
};
use super::repo;
use super::services;
use crate::{
    auth::{dto::PublicUser, repo_types::User, services::AuthUser},
    error::{AppError, AppResult},
    questionnaire::{self, dto::QuestionnaireAnswers, dto::QuestionnaireResponse},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/name", put(set_name))
        .route("/profile/questionnaire", put(update_questionnaire))
        .route("/profile/weight", get(get_weight).post(record_weight))
        .route("/profile/goals", put(set_goals))
        .route("/profile/settings", get(get_settings).put(set_preferences))
        .route("/profile/settings/water-goal", put(set_water_goal))
}

fn invalid(msg: &str) -> AppError {
    AppError::Validation(msg.into())
}

async fn load_user(state: &AppState, user_id: uuid::Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user not found".into()))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = load_user(&state, user_id).await?;
    let questionnaire = questionnaire::repo::latest_for_user(&state.db, user_id).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        goals: user.goals,
        questionnaire,
    }))
}

#[instrument(skip(state))]
pub async fn set_name(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NameRequest>,
) -> AppResult<Json<PublicUser>> {
    let name = services::normalize_name(&body.name).map_err(invalid)?;
    let user = User::set_name(&state.db, user_id, &name)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user not found".into()))?;
    info!(%user_id, "display name updated");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, body))]
pub async fn update_questionnaire(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<QuestionnaireAnswers>,
) -> AppResult<Json<QuestionnaireResponse>> {
    if let Err(e) = questionnaire::services::validate_answers(&body) {
        warn!(%user_id, step = %e.step, reason = e.reason, "questionnaire edit rejected");
        return Err(AppError::Validation(e.to_string()));
    }
    let saved = questionnaire::repo::save_answers(&state.db, user_id, &body).await?;
    info!(%user_id, response_id = saved.id, "questionnaire answers updated");
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn get_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<WeightHistory>> {
    let entries = repo::weight_history(&state.db, user_id).await?;
    let series = services::daily_series(&entries, OffsetDateTime::now_utc().date());
    Ok(Json(WeightHistory { entries, series }))
}

/// Records today's weight and answers with the updated history.
#[instrument(skip(state))]
pub async fn record_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RecordWeightRequest>,
) -> AppResult<Json<WeightHistory>> {
    let kg = services::validate_weight(body.weight).map_err(invalid)?;
    let today = OffsetDateTime::now_utc().date();
    let mut entries = repo::weight_history(&state.db, user_id).await?;
    let entry = repo::record_weight(&state.db, user_id, today, kg).await?;
    services::upsert_entry(&mut entries, entry);
    info!(%user_id, date = %entry.date, "weight recorded");

    let series = services::daily_series(&entries, today);
    Ok(Json(WeightHistory { entries, series }))
}

#[instrument(skip(state))]
pub async fn set_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GoalsRequest>,
) -> AppResult<Json<Vec<String>>> {
    let goals = services::normalize_goals(&body.goals).map_err(invalid)?;
    load_user(&state, user_id).await?;
    User::set_goals(&state.db, user_id, &goals).await?;
    info!(%user_id, count = goals.len(), "goals updated");
    Ok(Json(goals))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Settings>> {
    let row = repo::settings(&state.db, user_id).await?;
    Ok(Json(services::resolve_settings(row)))
}

#[instrument(skip(state))]
pub async fn set_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PreferencesRequest>,
) -> AppResult<Json<Settings>> {
    let language = body
        .language
        .as_deref()
        .map(services::validate_language)
        .transpose()
        .map_err(invalid)?;
    let row =
        repo::set_preferences(&state.db, user_id, body.notifications, body.dark_mode, language)
            .await?;
    info!(%user_id, "preferences updated");
    Ok(Json(services::resolve_settings(Some(row))))
}

#[instrument(skip(state))]
pub async fn set_water_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<WaterGoalRequest>,
) -> AppResult<Json<Settings>> {
    let ml = services::validate_water_goal(body.water_goal).map_err(invalid)?;
    let row = repo::set_water_goal(&state.db, user_id, ml).await?;
    info!(%user_id, water_goal = ml, "water goal updated");
    Ok(Json(services::resolve_settings(Some(row))))
}
