use crate::auth::AuthService;
use crate::config::Config;
use crate::contracts::{self, ContractForm, Page};
use crate::crm;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::repository::ClientStore;
use crate::tasks::{self, BoardColumn};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Data-access layer over the clients and activities tables.
    pub store: Arc<dyn ClientStore>,
    /// Session/auth context, explicitly passed instead of ambient globals.
    pub auth: AuthService,
    /// Application configuration.
    pub config: Config,
}

/// Assemble the API routes. Middleware layers are applied by the caller.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/navigation/tabs", get(navigation_tabs))
        .route("/api/v1/auth/signup", post(sign_up))
        .route("/api/v1/auth/login", post(sign_in))
        .route("/api/v1/auth/logout", post(sign_out))
        .route("/api/v1/auth/session", get(current_session))
        .route("/api/v1/clients", get(list_clients).post(create_client))
        .route("/api/v1/clients/:id", delete(delete_client))
        .route("/api/v1/clients/:id/duplicate", post(duplicate_client))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/tasks/board", get(task_board))
        .route("/api/v1/contracts/preview", post(contract_preview))
        .route("/api/v1/contracts/export", post(contract_export))
        .route("/api/v1/contracts/send", post(contract_send))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "nexa-crm-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/v1/navigation/tabs
///
/// Static navigation surface: the tab identifiers of the shell and the login
/// route.
pub async fn navigation_tabs() -> Json<serde_json::Value> {
    Json(json!({
        "tabs": ["dashboard", "tasks", "crm", "contracts", "reports"],
        "login": "/auth"
    }))
}

// ============ Auth ============

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/signup
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.auth.sign_up(&creds.email, &creds.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<crate::auth::Session>, AppError> {
    let session = state.auth.sign_in(&creds.email, &creds.password).await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/logout
pub async fn sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> StatusCode {
    if let Some(session) = state.auth.session_from_headers(&headers).await {
        state.auth.sign_out(&session.token).await;
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/session
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Option<crate::auth::Session>> {
    Json(state.auth.session_from_headers(&headers).await)
}

// ============ CRM ============

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Search term, matched case-insensitively against name, company and
    /// email of the loaded set.
    pub q: Option<String>,
}

/// GET /api/v1/clients
///
/// Returns the full loaded set (created_at descending); when `q` is present
/// the same in-memory predicate the list view uses is applied, and `total`
/// still reports the pre-filter size so "no results" can be told apart from
/// an empty store.
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ClientListResponse>, AppError> {
    let clients = state.store.list().await?;
    let total = clients.len();

    let clients = match params.q.as_deref() {
        Some(term) if !term.is_empty() => crm::filter_clients(&clients, term)
            .into_iter()
            .cloned()
            .collect(),
        _ => clients,
    };

    Ok(Json(ClientListResponse { clients, total }))
}

/// POST /api/v1/clients
///
/// New-client form submission. Validation runs before anything else; the
/// session gate runs before any write. On success the stored record is
/// returned and a "client_added" activity has been attempted (best-effort).
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut req): Json<NewClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    crm::validate_new_client(&req).map_err(AppError::Validation)?;

    if state.auth.session_from_headers(&headers).await.is_none() {
        return Err(AppError::AuthRequired);
    }

    if let Some(mobile) = req.mobile_phone.take() {
        req.mobile_phone = Some(crm::normalize_br_phone(&mobile));
    }
    if let Some(whatsapp) = req.whatsapp.take() {
        req.whatsapp = Some(crm::normalize_br_phone(&whatsapp));
    }

    let client = state.store.create(&req).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// DELETE /api/v1/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/:id/duplicate
pub async fn duplicate_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let copy = state.store.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// GET /api/v1/dashboard
///
/// Read-only aggregation, re-queried on every call. The non-client stat
/// cards are static placeholders with no data source behind them.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, AppError> {
    let total_clients = state.store.count().await.context("counting clients")?;
    let recent_clients = state
        .store
        .recent_clients(3)
        .await
        .context("loading recent clients")?;
    let recent_activities = state
        .store
        .recent_activities(5)
        .await
        .context("loading recent activities")?;

    Ok(Json(DashboardSummary {
        total_clients,
        recent_clients,
        recent_activities,
        pending_tasks: PLACEHOLDER_PENDING_TASKS,
        signed_contracts: PLACEHOLDER_SIGNED_CONTRACTS,
        monthly_revenue: PLACEHOLDER_MONTHLY_REVENUE.to_string(),
    }))
}

// ============ Tasks ============

/// GET /api/v1/tasks/board
pub async fn task_board() -> Json<Vec<BoardColumn>> {
    Json(tasks::board(tasks::seed_tasks()))
}

// ============ Contracts ============

#[derive(Debug, Serialize)]
pub struct ContractPreviewResponse {
    pub preview: String,
}

#[derive(Debug, Serialize)]
pub struct ContractExportResponse {
    pub filename: String,
    pub pages: Vec<Page>,
    pub text: String,
}

/// POST /api/v1/contracts/preview
pub async fn contract_preview(Json(form): Json<ContractForm>) -> Json<ContractPreviewResponse> {
    let today = chrono::Utc::now().date_naive();
    Json(ContractPreviewResponse {
        preview: contracts::render_preview(&form, today),
    })
}

/// POST /api/v1/contracts/export
///
/// Blocked with a validation notice unless client name and value are filled;
/// no document is produced in that case.
pub async fn contract_export(
    Json(form): Json<ContractForm>,
) -> Result<Json<ContractExportResponse>, AppError> {
    contracts::validate_for_export(&form).map_err(AppError::Validation)?;

    let today = chrono::Utc::now().date_naive();
    let document = contracts::export_document(&form, today);
    let text = document.to_text();

    tracing::info!("Contract exported: {}", document.filename);
    Ok(Json(ContractExportResponse {
        filename: document.filename,
        pages: document.pages,
        text,
    }))
}

/// POST /api/v1/contracts/send
///
/// Stub notification; there is no signature-platform transport behind it.
pub async fn contract_send(
    Json(form): Json<ContractForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    contracts::validate_for_export(&form).map_err(AppError::Validation)?;

    tracing::info!("Contract queued for signature: {}", form.client_name);
    Ok(Json(json!({
        "message": contracts::signature_notice(&form.client_name)
    })))
}
