use crate::auth::repo_types::{NewUser, User};
use sqlx::PgConnection;
use uuid::Uuid;

impl User {
    pub async fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, username, password_hash, is_active, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Find a user by username.
    pub async fn find_by_username(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, username, password_hash, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(conn)
        .await
    }

    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, username, password_hash, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await
    }

    /// Insert a new user with an already hashed password.
    pub async fn create(conn: &mut PgConnection, new_user: &NewUser<'_>) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id, email, username, password_hash, is_active, created_at
            "#,
        )
        .bind(new_user.username)
        .bind(new_user.email) // Option<&str> → NULL allowed
        .bind(new_user.password_hash)
        .fetch_one(conn)
        .await
    }
}
