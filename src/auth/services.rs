use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    db::{release, DbError, WarehouseConn},
    error::AppError,
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    /// Hash checked against when the username is unknown.
    static ref TIMING_HASH: Option<String> = hash_password("moodmind-unknown-user").ok();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalized signup input.
pub struct Registration {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Registration {
    pub fn parse(username: &str, email: Option<&str>, password: String) -> Result<Self, AppError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        let email = match email.map(|e| e.trim().to_lowercase()) {
            Some(e) if e.is_empty() => None,
            Some(e) if !is_valid_email(&e) => {
                return Err(AppError::Validation("Invalid email".into()));
            }
            other => other,
        };
        Ok(Self {
            username,
            email,
            password,
        })
    }
}

fn conflict_message(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "Email already registered"
    } else {
        "Username already registered"
    }
}

/// Creates the user unless the username or email is taken.
pub async fn signup(state: &AppState, reg: Registration) -> Result<User, AppError> {
    let mut conn = state.warehouse.connect().await?;
    let result = create_user(&mut *conn, &reg).await;
    release(conn, result).await
}

async fn create_user(conn: &mut dyn WarehouseConn, reg: &Registration) -> Result<User, AppError> {
    if conn.find_user_by_username(&reg.username).await?.is_some() {
        warn!(username = %reg.username, "username already registered");
        return Err(AppError::Conflict("Username already registered".into()));
    }
    if let Some(email) = reg.email.as_deref() {
        if conn.find_user_by_email(email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict("Email already registered".into()));
        }
    }

    let hash = hash_password(&reg.password)?;
    let new_user = NewUser {
        username: &reg.username,
        email: reg.email.as_deref(),
        password_hash: &hash,
    };
    let user = match conn.insert_user(&new_user).await {
        Ok(u) => u,
        // lost a race with a concurrent signup
        Err(DbError::UniqueViolation(constraint)) => {
            warn!(%constraint, "unique violation on insert");
            return Err(AppError::Conflict(conflict_message(&constraint).into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };
    conn.commit().await?;

    info!(user_id = %user.user_id, username = %user.username, "user registered");
    Ok(user)
}

/// Returns the user when `username` exists, is active and `password` matches.
/// Every mismatch yields the same `Unauthorized`.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<User, AppError> {
    let mut conn = state.warehouse.connect().await?;
    let result = authenticate(&mut *conn, username.trim(), password).await;
    release(conn, result).await
}

async fn authenticate(
    conn: &mut dyn WarehouseConn,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = conn.find_user_by_username(username).await? else {
        // same Argon2 cost as a real check so timing does not reveal the miss
        if let Some(hash) = TIMING_HASH.as_deref() {
            let _ = verify_password(password, hash);
        }
        warn!(%username, "login unknown username");
        return Err(AppError::Unauthorized);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = %user.user_id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        warn!(%username, user_id = %user.user_id, "login on inactive account");
        return Err(AppError::Unauthorized);
    }

    info!(user_id = %user.user_id, "user logged in");
    Ok(user)
}
