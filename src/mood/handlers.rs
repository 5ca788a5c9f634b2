use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::jwt::MaybeAuthUser,
    error::{AppError, AppJson},
    mood::{
        dto::{MoodRequest, MoodResponse},
        services,
    },
    state::AppState,
};

pub fn mood_routes() -> Router<AppState> {
    Router::new().route("/api/get-mood-response", post(get_mood_response))
}

#[instrument(skip(state, payload), fields(emoji = %payload.emoji))]
pub async fn get_mood_response(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    AppJson(payload): AppJson<MoodRequest>,
) -> Result<Json<MoodResponse>, AppError> {
    let response = services::mood_response(&state, user_id, &payload.emoji).await?;
    Ok(Json(MoodResponse { response }))
}
