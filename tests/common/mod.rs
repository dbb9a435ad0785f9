//! Shared test fixtures: an in-memory `ClientStore`/`UserStore` pair standing
//! in for Postgres, plus router helpers for exercising the HTTP surface.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bigdecimal::BigDecimal;
use chrono::Utc;
use nexa_crm_api::auth::{AuthService, Session, UserStore};
use nexa_crm_api::config::Config;
use nexa_crm_api::crm::COPY_MARKER;
use nexa_crm_api::errors::AppError;
use nexa_crm_api::handlers::{api_router, AppState};
use nexa_crm_api::models::{Activity, Client, ClientStatus, NewClientRequest, User};
use nexa_crm_api::repository::ClientStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

/// In-memory stand-in for the Postgres client store. Insertion order doubles
/// as creation order, so "newest first" is the reverse of the backing vec.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: Mutex<Vec<Client>>,
    activities: Mutex<Vec<Activity>>,
    /// When set, every activity insert fails, to exercise the best-effort
    /// audit-log policy.
    pub fail_activity_log: AtomicBool,
}

impl MemoryClientStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.activities.lock().unwrap().clone()
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    fn log_activity(&self, activity_type: &str, entity_id: Option<Uuid>, description: String) {
        if self.fail_activity_log.load(Ordering::SeqCst) {
            // Mirrors the production policy: failure is logged, not surfaced.
            return;
        }
        self.activities.lock().unwrap().push(Activity {
            id: Uuid::new_v4(),
            activity_type: activity_type.to_string(),
            entity_type: "client".to_string(),
            entity_id,
            description,
            created_at: Utc::now(),
        });
    }

    fn client_from_request(req: &NewClientRequest) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            tax_id: Some(req.tax_id.clone()),
            street: req.street.clone(),
            city: req.city.clone(),
            state: req.state.clone(),
            country: req.country.clone(),
            postal_code: req.postal_code.clone(),
            mobile_phone: req.mobile_phone.clone(),
            landline: req.landline.clone(),
            whatsapp: req.whatsapp.clone(),
            email: Some(req.email.clone()),
            linkedin: req.linkedin.clone(),
            instagram: req.instagram.clone(),
            job_title: req.job_title.clone(),
            company: req.company.clone(),
            sector: Some(req.sector.clone()),
            company_size: req.company_size.clone(),
            lead_source: Some(req.lead_source.clone()),
            interaction_history: req.interaction_history.clone(),
            status: ClientStatus::Lead,
            value: BigDecimal::from(0),
            last_contact: Some(Utc::now().date_naive()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients = self.clients.lock().unwrap();
        Ok(clients.iter().rev().cloned().collect())
    }

    async fn create(&self, req: &NewClientRequest) -> Result<Client, AppError> {
        let client = Self::client_from_request(req);
        self.clients.lock().unwrap().push(client.clone());
        self.log_activity(
            "client_added",
            Some(client.id),
            format!("Novo cliente adicionado: {}", client.name),
        );
        Ok(client)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = {
            let mut clients = self.clients.lock().unwrap();
            let position = clients.iter().position(|c| c.id == id);
            position.map(|idx| clients.remove(idx))
        };
        let client = removed
            .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;
        self.log_activity(
            "client_deleted",
            Some(id),
            format!("Cliente removido: {}", client.name),
        );
        Ok(())
    }

    async fn duplicate(&self, id: Uuid) -> Result<Client, AppError> {
        let original = {
            let clients = self.clients.lock().unwrap();
            clients.iter().find(|c| c.id == id).cloned()
        }
        .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

        let mut copy = original.clone();
        copy.id = Uuid::new_v4();
        copy.name = format!("{}{}", original.name, COPY_MARKER);
        copy.created_at = Utc::now();
        copy.updated_at = None;

        self.clients.lock().unwrap().push(copy.clone());
        self.log_activity(
            "client_added",
            Some(copy.id),
            format!("Cliente duplicado: {}", copy.name),
        );
        Ok(copy)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.clients.lock().unwrap().len() as i64)
    }

    async fn recent_clients(&self, limit: i64) -> Result<Vec<Client>, AppError> {
        let clients = self.clients.lock().unwrap();
        Ok(clients.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn recent_activities(&self, limit: i64) -> Result<Vec<Activity>, AppError> {
        let activities = self.activities.lock().unwrap();
        Ok(activities
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// In-memory user store for the auth service.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, email: &str, digest: &str, salt: &str) -> Result<User, AppError> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_digest: digest.to_string(),
            password_salt: salt.to_string(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        port: 0,
        session_ttl_secs: 3600,
    }
}

pub fn test_auth() -> AuthService {
    AuthService::new(Arc::new(MemoryUserStore::default()), Duration::from_secs(3600))
}

/// Build the full router over the given fake store.
pub fn test_app(store: Arc<MemoryClientStore>) -> (Router, AuthService) {
    let auth = test_auth();
    let state = Arc::new(AppState {
        store,
        auth: auth.clone(),
        config: test_config(),
    });
    (api_router(state), auth)
}

/// Install a live session and return its bearer token.
pub async fn seeded_token(auth: &AuthService) -> String {
    let token = Uuid::new_v4().to_string();
    auth.install_session(Session {
        token: token.clone(),
        user_id: Uuid::new_v4(),
        email: "tester@nexa.com".to_string(),
        expires_at: Utc::now() + chrono::Duration::hours(1),
    })
    .await;
    token
}

/// Fire a JSON request at the router and decode the JSON response body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// A fully valid new-client payload.
pub fn valid_client_payload(name: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "tax_id": "11.222.333/0001-44",
        "email": email,
        "sector": "Tech",
        "lead_source": "Referral",
        "company": "Tech Solutions"
    })
}
