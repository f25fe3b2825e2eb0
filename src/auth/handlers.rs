use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{
            hash_password, normalize_email, validate_registration, verify_password, AuthUser,
            JwtKeys,
        },
    },
    error::is_unique_violation,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn email_taken() -> (StatusCode, String) {
    (StatusCode::CONFLICT, "Email already registered".into())
}

/// A concurrent registration can still win the unique email key after the lookup.
fn create_failed(e: anyhow::Error) -> (StatusCode, String) {
    if is_unique_violation(&e) {
        warn!("email registered concurrently");
        return email_taken();
    }
    error!(error = %e, "create user failed");
    internal(e)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);

    if let Err(msg) = validate_registration(&payload.email, &payload.password, &payload.name) {
        warn!(email = %payload.email, reason = msg, "invalid registration");
        return Err((StatusCode::BAD_REQUEST, msg.into()));
    }

    // Ensure email is not taken
    let existing = User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(|e| {
            error!(error = %e, "find_by_email failed");
            internal(e)
        })?;
    if existing.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(email_taken());
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        internal(e)
    })?;

    let user = User::create(&state.db, &payload.email, &hash, payload.name.trim())
        .await
        .map_err(create_failed)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let keys = JwtKeys::from_ref(&state);
    keys.issue(user).map(Json).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        internal(e)
    })
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        internal(e)
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    keys.issue(user).map(Json).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        internal(e)
    })
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    keys.issue(user).map(Json).map_err(internal)
}

/// Tokens are stateless; the client drops them.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> StatusCode {
    info!(%user_id, "user logged out");
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser::from(user)))
}
