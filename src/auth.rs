//! Session and account management.
//!
//! Sessions are server-side bearer tokens held in a TTL cache; auth state
//! changes are published on a broadcast channel so interested parties can
//! subscribe instead of polling ambient global state.

use crate::crm::is_valid_email;
use crate::errors::AppError;
use crate::models::User;
use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// An active authenticated session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Auth state change, published to subscribers on every transition.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn { email: String },
    SignedOut { email: String },
}

/// Persistence contract for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert(&self, email: &str, digest: &str, salt: &str) -> Result<User, AppError>;
}

/// Postgres-backed implementation of [`UserStore`].
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, email: &str, digest: &str, salt: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_digest, password_salt)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(digest)
        .bind(salt)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

/// Explicitly passed auth context: current-session lookup plus a
/// subscribe-to-change capability.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Cache<String, Session>,
    events: broadcast::Sender<AuthEvent>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, session_ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .time_to_live(session_ttl)
            .max_capacity(10_000)
            .build();
        let (events, _) = broadcast::channel(64);
        Self {
            users,
            sessions,
            events,
            session_ttl,
        }
    }

    /// Register a new account. The email must be syntactically valid and not
    /// already taken.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::BadRequest("E-mail inválido".to_string()));
        }
        if password.len() < 6 {
            return Err(AppError::BadRequest(
                "A senha deve ter pelo menos 6 caracteres".to_string(),
            ));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("E-mail já cadastrado".to_string()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let digest = password_digest(password, &salt);
        let user = self.users.insert(&email, &digest, &salt).await?;

        tracing::info!("User registered: {}", user.email);
        Ok(user)
    }

    /// Verify credentials and mint a session token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciais inválidas".to_string()))?;

        if password_digest(password, &user.password_salt) != user.password_digest {
            return Err(AppError::Unauthorized("Credenciais inválidas".to_string()));
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            email: user.email.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(self.session_ttl.as_secs() as i64),
        };
        self.sessions
            .insert(session.token.clone(), session.clone())
            .await;

        let _ = self.events.send(AuthEvent::SignedIn {
            email: user.email.clone(),
        });
        tracing::info!("User signed in: {}", user.email);
        Ok(session)
    }

    /// Look up the session behind a bearer token, if still alive.
    pub async fn session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).await
    }

    /// Resolve the current session from request headers.
    pub async fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = bearer_token(headers)?;
        self.session(&token).await
    }

    /// Evict the session and notify subscribers.
    pub async fn sign_out(&self, token: &str) {
        if let Some(session) = self.sessions.get(token).await {
            self.sessions.invalidate(token).await;
            let _ = self.events.send(AuthEvent::SignedOut {
                email: session.email.clone(),
            });
            tracing::info!("User signed out: {}", session.email);
        }
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Test seam: pre-install a session without going through sign-in.
    pub async fn install_session(&self, session: Session) {
        self.sessions
            .insert(session.token.clone(), session)
            .await;
    }
}

fn password_digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}
