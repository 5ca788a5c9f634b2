use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, SignupRequest},
        jwt::JwtKeys,
        services::{self, Registration},
    },
    error::{AppError, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let reg = Registration::parse(&payload.username, payload.email.as_deref(), payload.password)?;
    services::signup(&state, reg).await?;
    Ok(Json(MessageResponse {
        message: "User signed up successfully",
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = services::login(&state, &payload.username, &payload.password).await?;

    let access_token = JwtKeys::from_ref(&state)
        .sign_access(user.user_id)
        .map_err(|e| {
            error!(error = %e, "jwt sign access failed");
            AppError::Internal(e.to_string())
        })?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        access_token,
    }))
}
