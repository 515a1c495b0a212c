//! Assignment and lead repository for database operations.
//!
//! Lists are most recent first. Rows written by one upload share the
//! transaction timestamp, so ties fall back to descending id.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use leaddesk_core::{AgentId, AssignmentId, LeadId, LeadRecord};

use super::RepositoryError;
use super::agents::RecipientRow;
use crate::models::{AgentAssignmentCount, Assignment, AssignmentDetail, Lead, Recipient};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: i32,
    first_name: String,
    phone: String,
    notes: String,
    created_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Self {
            id: LeadId::new(row.id),
            first_name: row.first_name,
            phone: row.phone,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: i32,
    agent_id: i32,
    lead_id: i32,
    created_at: DateTime<Utc>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: AssignmentId::new(row.id),
            agent_id: AgentId::new(row.agent_id),
            lead_id: LeadId::new(row.lead_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentDetailRow {
    id: i32,
    created_at: DateTime<Utc>,
    agent_id: i32,
    agent_name: String,
    agent_email: String,
    lead_id: i32,
    first_name: String,
    phone: String,
    notes: String,
    lead_created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentDetailRow> for AssignmentDetail {
    type Error = RepositoryError;

    fn try_from(row: AssignmentDetailRow) -> Result<Self, Self::Error> {
        let recipient = Recipient::try_from(RecipientRow {
            id: row.agent_id,
            name: row.agent_name,
            email: row.agent_email,
        })?;

        Ok(Self {
            id: AssignmentId::new(row.id),
            recipient,
            lead: Lead {
                id: LeadId::new(row.lead_id),
                first_name: row.first_name,
                phone: row.phone,
                notes: row.notes,
                created_at: row.lead_created_at,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentCountRow {
    #[sqlx(flatten)]
    recipient: RecipientRow,
    assigned_count: i64,
}

const DETAIL_SELECT: &str = r"
    SELECT s.id, s.created_at,
           a.id AS agent_id, a.name AS agent_name, a.email AS agent_email,
           l.id AS lead_id, l.first_name, l.phone, l.notes, l.created_at AS lead_created_at
    FROM leaddesk.assignment s
    JOIN leaddesk.agent a ON a.id = s.agent_id
    JOIN leaddesk.lead l ON l.id = s.lead_id
";

// =============================================================================
// Writes (inside a caller-owned transaction)
// =============================================================================

/// Insert a lead on `conn`.
pub(super) async fn insert_lead(
    conn: &mut PgConnection,
    record: &LeadRecord,
) -> Result<Lead, RepositoryError> {
    let row = sqlx::query_as::<_, LeadRow>(
        r"
        INSERT INTO leaddesk.lead (first_name, phone, notes)
        VALUES ($1, $2, $3)
        RETURNING id, first_name, phone, notes, created_at
        ",
    )
    .bind(record.first_name())
    .bind(record.phone())
    .bind(record.notes())
    .fetch_one(conn)
    .await?;

    Ok(row.into())
}

/// Insert an assignment on `conn`.
pub(super) async fn insert_assignment(
    conn: &mut PgConnection,
    agent_id: AgentId,
    lead_id: LeadId,
) -> Result<Assignment, RepositoryError> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        r"
        INSERT INTO leaddesk.assignment (agent_id, lead_id)
        VALUES ($1, $2)
        RETURNING id, agent_id, lead_id, created_at
        ",
    )
    .bind(agent_id)
    .bind(lead_id)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::unique_violation(e, "lead is already assigned"))?;

    Ok(row.into())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reading assignments.
pub struct AssignmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AssignmentRepository<'a> {
    /// Create a new assignment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Assignments held by one agent, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_for_agent(
        &self,
        agent_id: AgentId,
    ) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} WHERE s.agent_id = $1 ORDER BY s.created_at DESC, s.id DESC");
        let rows = sqlx::query_as::<_, AssignmentDetailRow>(&sql)
            .bind(agent_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Every assignment, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} ORDER BY s.created_at DESC, s.id DESC");
        let rows = sqlx::query_as::<_, AssignmentDetailRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Assignment count for every agent, oldest agent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn counts_by_agent(&self) -> Result<Vec<AgentAssignmentCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentCountRow>(
            r"
            SELECT a.id, a.name, a.email, COUNT(s.id) AS assigned_count
            FROM leaddesk.agent a
            LEFT JOIN leaddesk.assignment s ON s.agent_id = a.id
            GROUP BY a.id
            ORDER BY a.created_at ASC, a.id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(AgentAssignmentCount {
                    recipient: row.recipient.try_into()?,
                    assigned_count: row.assigned_count,
                })
            })
            .collect()
    }

    /// Number of stored leads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_leads(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaddesk.lead")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
