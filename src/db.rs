use async_trait::async_trait;
use sqlx::{postgres::PgConnectOptions, Connection, PgConnection};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    config::WarehouseConfig,
    mood::repo::MoodRating,
};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("warehouse connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("duplicate value for {0}")]
    UniqueViolation(String),
    #[error("warehouse query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unique key").to_string();
                return DbError::UniqueViolation(constraint);
            }
        }
        DbError::Query(e)
    }
}

/// Opens connections to the warehouse. One connection per request, no pooling.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn WarehouseConn>, DbError>;
}

/// A single open warehouse connection.
///
/// Writes are staged in a transaction that begins with the first statement and
/// ends at `commit` or `rollback`. `close` discards anything uncommitted.
#[async_trait]
pub trait WarehouseConn: Send {
    async fn find_user_by_id(&mut self, user_id: Uuid) -> Result<Option<User>, DbError>;
    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DbError>;
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DbError>;
    async fn insert_user(&mut self, new_user: &NewUser<'_>) -> Result<User, DbError>;
    async fn insert_mood_rating(
        &mut self,
        user_id: Option<Uuid>,
        mood: &str,
    ) -> Result<MoodRating, DbError>;
    async fn commit(&mut self) -> Result<(), DbError>;
    async fn rollback(&mut self) -> Result<(), DbError>;
    async fn close(self: Box<Self>) -> Result<(), DbError>;
}

/// Ends the lifetime of `conn` whatever `result` holds: rolls back on error,
/// then closes. A failed close is logged and never replaces `result`.
pub async fn release<T, E>(mut conn: Box<dyn WarehouseConn>, result: Result<T, E>) -> Result<T, E> {
    if result.is_err() {
        if let Err(e) = conn.rollback().await {
            warn!(error = %e, "rollback failed");
        }
    }
    if let Err(e) = conn.close().await {
        warn!(error = %e, "closing warehouse connection failed");
    }
    result
}

#[derive(Clone)]
pub struct PgWarehouse {
    options: PgConnectOptions,
}

impl PgWarehouse {
    pub fn new(cfg: &WarehouseConfig) -> Self {
        let (host, port) = cfg.host_port();
        let mut options = PgConnectOptions::new()
            .host(host)
            .username(&cfg.user)
            .password(&cfg.password)
            .database(&cfg.database)
            .application_name(&cfg.warehouse)
            .options([("search_path", cfg.schema.as_str())]);
        if let Some(port) = port {
            options = options.port(port);
        }
        Self { options }
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        let outcome = sqlx::migrate!("./migrations").run(&mut conn).await;
        conn.close().await?;
        outcome?;
        Ok(())
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseConn>, DbError> {
        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(DbError::Connect)?;
        debug!("warehouse connection opened");
        Ok(Box::new(PgConn { conn, in_tx: false }))
    }
}

struct PgConn {
    conn: PgConnection,
    in_tx: bool,
}

impl PgConn {
    async fn begin_if_needed(&mut self) -> Result<(), DbError> {
        if !self.in_tx {
            sqlx::query("BEGIN").execute(&mut self.conn).await?;
            self.in_tx = true;
        }
        Ok(())
    }
}

#[async_trait]
impl WarehouseConn for PgConn {
    async fn find_user_by_id(&mut self, user_id: Uuid) -> Result<Option<User>, DbError> {
        Ok(User::find_by_id(&mut self.conn, user_id).await?)
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DbError> {
        Ok(User::find_by_username(&mut self.conn, username).await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DbError> {
        Ok(User::find_by_email(&mut self.conn, email).await?)
    }

    async fn insert_user(&mut self, new_user: &NewUser<'_>) -> Result<User, DbError> {
        self.begin_if_needed().await?;
        Ok(User::create(&mut self.conn, new_user).await?)
    }

    async fn insert_mood_rating(
        &mut self,
        user_id: Option<Uuid>,
        mood: &str,
    ) -> Result<MoodRating, DbError> {
        self.begin_if_needed().await?;
        Ok(MoodRating::insert(&mut self.conn, user_id, mood).await?)
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if self.in_tx {
            sqlx::query("COMMIT").execute(&mut self.conn).await?;
            self.in_tx = false;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        if self.in_tx {
            sqlx::query("ROLLBACK").execute(&mut self.conn).await?;
            self.in_tx = false;
        }
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> Result<(), DbError> {
        let rolled_back = self.rollback().await;
        self.conn.close().await?;
        debug!("warehouse connection closed");
        rolled_back
    }
}
