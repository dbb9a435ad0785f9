//! Data-access layer for clients and their audit activities.
//!
//! The storage contract is a narrow trait so the mutation/audit-log flow can
//! be exercised against a fake store in tests, without a live database.
//! Activity logging is deliberately best-effort: a failed audit insert is
//! logged and swallowed, never allowed to fail the primary mutation.

use crate::crm::COPY_MARKER;
use crate::errors::AppError;
use crate::models::{Activity, Client, NewClientRequest};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage contract over the `clients` and `activities` tables.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// All clients, ordered by creation time descending.
    async fn list(&self) -> Result<Vec<Client>, AppError>;

    /// Insert a new client with status "lead", value 0 and last contact set
    /// to today, then append a "client_added" activity (best-effort).
    async fn create(&self, req: &NewClientRequest) -> Result<Client, AppError>;

    /// Remove the client row, then append a "client_deleted" activity
    /// (best-effort). Fails with NotFound if the row does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Insert a copy of the client with a fresh identifier, the copy marker
    /// appended to its name and storage-assigned timestamps, then append a
    /// "client_added" activity (best-effort).
    async fn duplicate(&self, id: Uuid) -> Result<Client, AppError>;

    /// Exact count of client rows.
    async fn count(&self) -> Result<i64, AppError>;

    /// The `limit` most-recently-created clients.
    async fn recent_clients(&self, limit: i64) -> Result<Vec<Client>, AppError>;

    /// The `limit` most-recently-created activities, newest first.
    async fn recent_activities(&self, limit: i64) -> Result<Vec<Activity>, AppError>;
}

/// Postgres-backed implementation of [`ClientStore`].
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn log_activity(
        &self,
        activity_type: &str,
        entity_id: Option<Uuid>,
        description: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activities (activity_type, entity_type, entity_id, description)
            VALUES ($1, 'client', $2, $3)
            "#,
        )
        .bind(activity_type)
        .bind(entity_id)
        .bind(description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients =
            sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(clients)
    }

    async fn create(&self, req: &NewClientRequest) -> Result<Client, AppError> {
        let today = chrono::Utc::now().date_naive();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                name, tax_id, street, city, state, country, postal_code,
                mobile_phone, landline, whatsapp, email, linkedin, instagram,
                job_title, company, sector, company_size, lead_source,
                interaction_history, status, value, last_contact
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18,
                $19, 'lead', 0, $20
            )
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.tax_id)
        .bind(&req.street)
        .bind(&req.city)
        .bind(&req.state)
        .bind(&req.country)
        .bind(&req.postal_code)
        .bind(&req.mobile_phone)
        .bind(&req.landline)
        .bind(&req.whatsapp)
        .bind(&req.email)
        .bind(&req.linkedin)
        .bind(&req.instagram)
        .bind(&req.job_title)
        .bind(&req.company)
        .bind(&req.sector)
        .bind(&req.company_size)
        .bind(&req.lead_source)
        .bind(&req.interaction_history)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        // Audit trail is best-effort: the client row is already committed.
        if let Err(e) = self
            .log_activity(
                "client_added",
                Some(client.id),
                &format!("Novo cliente adicionado: {}", client.name),
            )
            .await
        {
            tracing::warn!("Failed to record client_added activity for {}: {}", client.id, e);
        }

        tracing::info!("Client created: {} ({})", client.name, client.id);
        Ok(client)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let client = self
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if let Err(e) = self
            .log_activity(
                "client_deleted",
                Some(id),
                &format!("Cliente removido: {}", client.name),
            )
            .await
        {
            tracing::warn!("Failed to record client_deleted activity for {}: {}", id, e);
        }

        tracing::info!("Client deleted: {} ({})", client.name, id);
        Ok(())
    }

    async fn duplicate(&self, id: Uuid) -> Result<Client, AppError> {
        let original = self
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

        let copy_name = format!("{}{}", original.name, COPY_MARKER);

        let copy = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                name, tax_id, street, city, state, country, postal_code,
                mobile_phone, landline, whatsapp, email, linkedin, instagram,
                job_title, company, sector, company_size, lead_source,
                interaction_history, status, value, last_contact
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18,
                $19, $20, $21, $22
            )
            RETURNING *
            "#,
        )
        .bind(&copy_name)
        .bind(&original.tax_id)
        .bind(&original.street)
        .bind(&original.city)
        .bind(&original.state)
        .bind(&original.country)
        .bind(&original.postal_code)
        .bind(&original.mobile_phone)
        .bind(&original.landline)
        .bind(&original.whatsapp)
        .bind(&original.email)
        .bind(&original.linkedin)
        .bind(&original.instagram)
        .bind(&original.job_title)
        .bind(&original.company)
        .bind(&original.sector)
        .bind(&original.company_size)
        .bind(&original.lead_source)
        .bind(&original.interaction_history)
        .bind(original.status.as_str())
        .bind(&original.value)
        .bind(original.last_contact)
        .fetch_one(&self.pool)
        .await?;

        if let Err(e) = self
            .log_activity(
                "client_added",
                Some(copy.id),
                &format!("Cliente duplicado: {}", copy.name),
            )
            .await
        {
            tracing::warn!("Failed to record duplicate activity for {}: {}", copy.id, e);
        }

        tracing::info!("Client duplicated: {} -> {}", id, copy.id);
        Ok(copy)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn recent_clients(&self, limit: i64) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn recent_activities(&self, limit: i64) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }
}
