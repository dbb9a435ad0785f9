use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// Lifecycle stage of a customer record.
///
/// Stored as TEXT; decoding goes through `TryFrom<String>` so a row can never
/// materialize with a stage outside these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Lead,
    Prospect,
    Client,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Lead => "lead",
            ClientStatus::Prospect => "prospect",
            ClientStatus::Client => "client",
            ClientStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ClientStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "lead" => Ok(ClientStatus::Lead),
            "prospect" => Ok(ClientStatus::Prospect),
            "client" => Ok(ClientStatus::Client),
            "inactive" => Ok(ClientStatus::Inactive),
            other => Err(format!("unknown client status: {}", other)),
        }
    }
}

/// A prospective or existing customer record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier, generated on creation and immutable afterwards.
    pub id: Uuid,
    /// Legal or display name.
    pub name: String,
    /// CPF or CNPJ document number.
    pub tax_id: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    /// Mobile number, normalized to E.164 when it parses as a BR number.
    pub mobile_phone: Option<String>,
    pub landline: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    /// Industry sector. Required on creation.
    pub sector: Option<String>,
    pub company_size: Option<String>,
    /// How the lead found the agency. Required on creation.
    pub lead_source: Option<String>,
    /// Free-text interaction history (calls, meetings, e-mails).
    pub interaction_history: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ClientStatus,
    /// Monetary value of the relationship. Never negative.
    pub value: BigDecimal,
    pub last_contact: Option<NaiveDate>,
    /// Timestamp of creation (assigned by storage).
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update (assigned by storage).
    pub updated_at: Option<DateTime<Utc>>,
}

/// An append-only audit entry describing a state change to some entity.
///
/// Created as a side effect of client mutations and never updated or deleted
/// by this system.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    /// Free-form tag, e.g. "client_added" or "client_deleted".
    pub activity_type: String,
    /// Kind of entity the entry refers to (currently always "client").
    pub entity_type: String,
    /// Weak reference to the mutated entity; lookup only, no integrity
    /// enforcement from this layer.
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated account able to mutate the CRM.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

// ============ API Request/Response Models ============

/// Payload of the new-client form.
///
/// Field requirements mirror the form: name, email, sector and lead source
/// are mandatory, everything else optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClientRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tax_id: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub mobile_phone: Option<String>,
    pub landline: Option<String>,
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: String,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub sector: String,
    pub company_size: Option<String>,
    #[serde(default)]
    pub lead_source: String,
    pub interaction_history: Option<String>,
}

/// Response of GET /api/v1/clients.
///
/// `total` is the size of the loaded set before filtering, so a caller can
/// tell "no results for this search" apart from "no clients at all".
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub total: usize,
}

/// Read-only aggregation backing the dashboard view.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Exact count query against the clients table.
    pub total_clients: i64,
    /// Three most-recently-created clients.
    pub recent_clients: Vec<Client>,
    /// Five most-recently-created activities, newest first.
    pub recent_activities: Vec<Activity>,
    /// Static placeholder, not wired to storage.
    pub pending_tasks: i64,
    /// Static placeholder, not wired to storage.
    pub signed_contracts: i64,
    /// Static placeholder, not wired to storage.
    pub monthly_revenue: String,
}

/// Placeholder values for the dashboard stat cards that have no data source.
pub const PLACEHOLDER_PENDING_TASKS: i64 = 18;
pub const PLACEHOLDER_SIGNED_CONTRACTS: i64 = 8;
pub const PLACEHOLDER_MONTHLY_REVENUE: &str = "R$ 42.800";
