//! In-memory stand-ins for the warehouse and the completion service.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    db::{DbError, Warehouse, WarehouseConn},
    llm::{CompletionClient, CompletionError, CompletionRequest},
    mood::repo::MoodRating,
};

#[derive(Default)]
struct FakeDb {
    users: Vec<User>,
    ratings: Vec<MoodRating>,
    opened: usize,
    closed: usize,
}

/// Statement that fails once the connection is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Insert,
    Commit,
}

/// Shared in-memory warehouse. Clones see the same rows and counters.
///
/// `mood_ratings.user_id` is checked against committed and staged users the
/// way the foreign key does it.
#[derive(Clone, Default)]
pub struct FakeWarehouse {
    db: Arc<Mutex<FakeDb>>,
    unreachable: bool,
    fail_at: Option<FailAt>,
}

fn query_error(msg: &str) -> DbError {
    DbError::Query(sqlx::Error::Protocol(msg.to_string()))
}

impl FakeWarehouse {
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at: Some(fail_at),
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeDb> {
        self.db.lock().unwrap()
    }

    /// Committed users.
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Committed mood ratings.
    pub fn ratings(&self) -> Vec<MoodRating> {
        self.lock().ratings.clone()
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.lock().closed
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseConn>, DbError> {
        if self.unreachable {
            return Err(DbError::Connect(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "warehouse unreachable",
            ))));
        }
        self.lock().opened += 1;
        Ok(Box::new(FakeConn {
            db: self.db.clone(),
            fail_at: self.fail_at,
            pending_users: Vec::new(),
            pending_ratings: Vec::new(),
        }))
    }
}

struct FakeConn {
    db: Arc<Mutex<FakeDb>>,
    fail_at: Option<FailAt>,
    pending_users: Vec<User>,
    pending_ratings: Vec<MoodRating>,
}

impl FakeConn {
    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        let db = self.db.lock().unwrap();
        db.users
            .iter()
            .chain(self.pending_users.iter())
            .find(|u| pred(*u))
            .cloned()
    }
}

#[async_trait]
impl WarehouseConn for FakeConn {
    async fn find_user_by_id(&mut self, user_id: Uuid) -> Result<Option<User>, DbError> {
        Ok(self.find_user(|u| u.user_id == user_id))
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>, DbError> {
        Ok(self.find_user(|u| u.username == username))
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DbError> {
        Ok(self.find_user(|u| u.email.as_deref() == Some(email)))
    }

    async fn insert_user(&mut self, new_user: &NewUser<'_>) -> Result<User, DbError> {
        if self.fail_at == Some(FailAt::Insert) {
            return Err(query_error("insert into users failed"));
        }
        if self.find_user(|u| u.username == new_user.username).is_some() {
            return Err(DbError::UniqueViolation("users_username_key".into()));
        }
        if let Some(email) = new_user.email {
            if self.find_user(|u| u.email.as_deref() == Some(email)).is_some() {
                return Err(DbError::UniqueViolation("users_email_key".into()));
            }
        }
        let user = User {
            user_id: Uuid::new_v4(),
            email: new_user.email.map(str::to_string),
            username: new_user.username.to_string(),
            password_hash: new_user.password_hash.to_string(),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.pending_users.push(user.clone());
        Ok(user)
    }

    async fn insert_mood_rating(
        &mut self,
        user_id: Option<Uuid>,
        mood: &str,
    ) -> Result<MoodRating, DbError> {
        if self.fail_at == Some(FailAt::Insert) {
            return Err(query_error("insert into mood_ratings failed"));
        }
        if let Some(id) = user_id {
            if self.find_user(|u| u.user_id == id).is_none() {
                return Err(query_error(
                    "insert or update on table \"mood_ratings\" violates foreign key constraint",
                ));
            }
        }
        let now = OffsetDateTime::now_utc();
        let rating = MoodRating {
            rating_id: Uuid::new_v4(),
            user_id,
            mood: mood.to_string(),
            date: now,
            created_at: now,
        };
        self.pending_ratings.push(rating.clone());
        Ok(rating)
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if self.fail_at == Some(FailAt::Commit) {
            return Err(query_error("commit failed"));
        }
        let mut db = self.db.lock().unwrap();
        db.users.append(&mut self.pending_users);
        db.ratings.append(&mut self.pending_ratings);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.pending_users.clear();
        self.pending_ratings.clear();
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> Result<(), DbError> {
        self.rollback().await?;
        self.db.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Completion service that records every request and returns a canned reply,
/// or fails when built with [`FakeCompletion::failing`].
#[derive(Clone)]
pub struct FakeCompletion {
    reply: Option<String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn generate(&self, req: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(req.clone());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(CompletionError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            }),
        }
    }
}
