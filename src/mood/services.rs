use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    db::{release, WarehouseConn},
    error::AppError,
    llm::{CompletionClient, CompletionRequest},
    mood::prompts::{lookup, MOOD_USER_MESSAGE},
    state::AppState,
};

pub const MOOD_MAX_TOKENS: u32 = 150;
pub const MOOD_TEMPERATURE: f32 = 0.7;

/// Records the rating, then asks the completion service for a reply in the
/// persona matching `emoji`.
///
/// The rating is committed before the completion call, so it stays persisted
/// even when generation fails. The connection is closed on every path.
pub async fn mood_response(
    state: &AppState,
    user_id: Option<Uuid>,
    emoji: &str,
) -> Result<String, AppError> {
    let mut conn = state.warehouse.connect().await.map_err(|e| {
        error!(error = %e, "warehouse connect failed");
        AppError::from(e)
    })?;
    let result = record_and_generate(&mut *conn, state.completion.as_ref(), user_id, emoji).await;
    release(conn, result).await
}

async fn record_and_generate(
    conn: &mut dyn WarehouseConn,
    completion: &dyn CompletionClient,
    user_id: Option<Uuid>,
    emoji: &str,
) -> Result<String, AppError> {
    let user_id = resolve_rater(conn, user_id).await?;
    let rating = conn.insert_mood_rating(user_id, emoji).await.map_err(|e| {
        error!(error = %e, "insert mood rating failed");
        AppError::from(e)
    })?;
    conn.commit().await?;
    info!(rating_id = %rating.rating_id, anonymous = user_id.is_none(), "mood rating recorded");

    let req = CompletionRequest {
        system_prompt: lookup(emoji).to_string(),
        user_message: MOOD_USER_MESSAGE.to_string(),
        max_tokens: MOOD_MAX_TOKENS,
        temperature: MOOD_TEMPERATURE,
    };
    completion.generate(&req).await.map_err(|e| {
        error!(error = %e, "completion failed");
        AppError::from(e)
    })
}

/// Keeps `user_id` only when it names an active user on this connection, so a
/// token outliving its user row records an anonymous rating.
async fn resolve_rater(
    conn: &mut dyn WarehouseConn,
    user_id: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    let Some(id) = user_id else {
        return Ok(None);
    };
    match conn.find_user_by_id(id).await? {
        Some(user) if user.is_active => Ok(Some(user.user_id)),
        _ => {
            warn!(user_id = %id, "token user missing or inactive; recording rating anonymously");
            Ok(None)
        }
    }
}
