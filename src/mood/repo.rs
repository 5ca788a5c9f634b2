use serde::Serialize;
use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;
use uuid::Uuid;

/// One recorded mood selection. Written once, never read back by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MoodRating {
    pub rating_id: Uuid,
    pub user_id: Option<Uuid>,
    pub mood: String,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl MoodRating {
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: Option<Uuid>,
        mood: &str,
    ) -> Result<MoodRating, sqlx::Error> {
        sqlx::query_as::<_, MoodRating>(
            r#"
            INSERT INTO mood_ratings (user_id, mood)
            VALUES ($1, $2)
            RETURNING rating_id, user_id, mood, date, created_at
            "#,
        )
        .bind(user_id)
        .bind(mood)
        .fetch_one(conn)
        .await
    }
}
