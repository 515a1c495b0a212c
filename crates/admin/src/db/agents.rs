//! Agent repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leaddesk_core::{AgentId, Email};

use super::RepositoryError;
use crate::models::{Agent, AgentSummary, NewAgent, Recipient};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AgentRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AgentRow> for Agent {
    type Error = RepositoryError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid agent email in database: {e}"))
        })?;

        Ok(Self {
            id: AgentId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AgentSummaryRow {
    #[sqlx(flatten)]
    agent: AgentRow,
    assigned_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RecipientRow {
    pub(super) id: i32,
    pub(super) name: String,
    pub(super) email: String,
}

impl TryFrom<RecipientRow> for Recipient {
    type Error = RepositoryError;

    fn try_from(row: RecipientRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid agent email in database: {e}"))
        })?;

        Ok(Self {
            id: AgentId::new(row.id),
            name: row.name,
            email,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for agent database operations.
pub struct AgentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AgentRepository<'a> {
    /// Create a new agent repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an agent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, agent: &NewAgent) -> Result<Agent, RepositoryError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"
            INSERT INTO leaddesk.agent (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone, created_at
            ",
        )
        .bind(&agent.name)
        .bind(&agent.email)
        .bind(&agent.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "an agent with this email already exists"))?;

        row.try_into()
    }

    /// List agents, newest first, with how many leads each holds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_with_counts(&self) -> Result<Vec<AgentSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, AgentSummaryRow>(
            r"
            SELECT a.id, a.name, a.email, a.phone, a.created_at,
                   COUNT(s.id) AS assigned_count
            FROM leaddesk.agent a
            LEFT JOIN leaddesk.assignment s ON s.agent_id = a.id
            GROUP BY a.id
            ORDER BY a.created_at DESC, a.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(AgentSummary {
                    agent: row.agent.try_into()?,
                    assigned_count: row.assigned_count,
                })
            })
            .collect()
    }

    /// Get an agent by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"
            SELECT id, name, email, phone, created_at
            FROM leaddesk.agent
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an agent by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Agent>, RepositoryError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"
            SELECT id, name, email, phone, created_at
            FROM leaddesk.agent
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Every agent as a distribution recipient, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_recipients(&self) -> Result<Vec<Recipient>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r"
            SELECT id, name, email
            FROM leaddesk.agent
            ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete an agent together with the leads assigned to it.
    ///
    /// Returns the number of leads removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the agent does not exist.
    /// Returns `RepositoryError::Database` if the query fails; nothing is
    /// deleted in that case.
    pub async fn delete(&self, id: AgentId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Assignments go with the leads through ON DELETE CASCADE.
        let leads = sqlx::query(
            r"
            DELETE FROM leaddesk.lead
            WHERE id IN (SELECT lead_id FROM leaddesk.assignment WHERE agent_id = $1)
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let agents = sqlx::query("DELETE FROM leaddesk.agent WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if agents == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(leads)
    }
}
