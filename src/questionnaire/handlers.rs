use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::QuestionnaireSubmission;
use super::{repo, services};
use crate::{
    auth::{
        dto::AuthResponse,
        repo_types::User,
        services::{hash_password, normalize_email, JwtKeys},
    },
    catalog::repo as catalog_repo,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn questionnaire_routes() -> Router<AppState> {
    Router::new().route("/questionnaire", post(submit))
}

#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    Json(mut payload): Json<QuestionnaireSubmission>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = normalize_email(&payload.email);

    if let Err(e) = services::validate(&payload) {
        warn!(step = %e.step, reason = e.reason, "questionnaire rejected");
        return Err(AppError::Validation(e.to_string()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let supplements = services::unique_supplements(&payload.current_supplements);
    for id in &supplements {
        if catalog_repo::find(&state.db, *id).await?.is_none() {
            return Err(AppError::Validation(format!("unknown supplement {}", id)));
        }
    }

    let hash = hash_password(&payload.password)?;
    let today = OffsetDateTime::now_utc().date();
    let user = repo::register(&state.db, &payload, &hash, &supplements, today)
        .await
        .map_err(|e| AppError::on_unique(e, "Email already registered"))?;

    info!(
        user_id = %user.id,
        supplements = supplements.len(),
        "user registered via questionnaire"
    );
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(keys.issue(user)?)))
}
