//! `PostgreSQL` implementation of the service storage seams.

use sqlx::{PgPool, Postgres, Transaction};

use leaddesk_core::{AgentId, LeadId, LeadRecord};

use super::RepositoryError;
use super::agents::AgentRepository;
use super::assignments::{self, AssignmentRepository};
use crate::models::{AgentAssignmentCount, Assignment, AssignmentDetail, Lead, Recipient};
use crate::services::assignments::AssignmentReader;
use crate::services::distribution::{LeadStore, LeadTransaction, RecipientDirectory};

/// Storage handle passed to the distribution and query services.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RecipientDirectory for PgStore {
    async fn list_all_recipients(&self) -> Result<Vec<Recipient>, RepositoryError> {
        AgentRepository::new(&self.pool).list_recipients().await
    }
}

/// One upload's write transaction. Dropping it rolls back.
pub struct PgLeadTransaction {
    tx: Transaction<'static, Postgres>,
}

impl LeadStore for PgStore {
    type Tx = PgLeadTransaction;

    async fn begin(&self) -> Result<PgLeadTransaction, RepositoryError> {
        Ok(PgLeadTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

impl LeadTransaction for PgLeadTransaction {
    async fn create_lead(&mut self, record: &LeadRecord) -> Result<Lead, RepositoryError> {
        assignments::insert_lead(&mut self.tx, record).await
    }

    async fn create_assignment(
        &mut self,
        agent_id: AgentId,
        lead_id: LeadId,
    ) -> Result<Assignment, RepositoryError> {
        assignments::insert_assignment(&mut self.tx, agent_id, lead_id).await
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl AssignmentReader for PgStore {
    async fn assignments_for_agent(
        &self,
        agent_id: AgentId,
    ) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        AssignmentRepository::new(&self.pool).list_for_agent(agent_id).await
    }

    async fn all_assignments(&self) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        AssignmentRepository::new(&self.pool).list_all().await
    }

    async fn assignment_counts(&self) -> Result<Vec<AgentAssignmentCount>, RepositoryError> {
        AssignmentRepository::new(&self.pool).counts_by_agent().await
    }

    async fn count_leads(&self) -> Result<i64, RepositoryError> {
        AssignmentRepository::new(&self.pool).count_leads().await
    }
}
