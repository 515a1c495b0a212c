//! Read-side views over committed assignments.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;

use leaddesk_core::{AgentId, LeadId};

use crate::db::RepositoryError;
use crate::models::{AgentAssignmentCount, AssignmentDetail, AssignmentStats, Lead, Recipient};

/// Read access to assignments.
///
/// Every list is ordered most recent first; rows written by the same upload
/// share a timestamp and fall back to descending id.
pub trait AssignmentReader {
    /// Assignments held by one agent. Unknown agents have none.
    fn assignments_for_agent(
        &self,
        agent_id: AgentId,
    ) -> impl Future<Output = Result<Vec<AssignmentDetail>, RepositoryError>> + Send;

    /// Every assignment.
    fn all_assignments(
        &self,
    ) -> impl Future<Output = Result<Vec<AssignmentDetail>, RepositoryError>> + Send;

    /// Assignment count for every agent, in agent creation order.
    fn assignment_counts(
        &self,
    ) -> impl Future<Output = Result<Vec<AgentAssignmentCount>, RepositoryError>> + Send;

    /// Number of stored leads.
    fn count_leads(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

/// One lead inside a [`RecipientGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedLead {
    pub lead_id: LeadId,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub assigned_at: DateTime<Utc>,
}

/// The leads one agent holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientGroup {
    pub recipient: Recipient,
    pub items: Vec<GroupedLead>,
}

/// Queries over who holds which lead.
pub struct AssignmentQueryService<S> {
    store: S,
}

impl<S> AssignmentQueryService<S>
where
    S: AssignmentReader + Sync,
{
    /// Create a query service over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Leads assigned to `agent_id`, most recent first.
    ///
    /// An unknown agent and an agent without leads both yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn list_by_recipient(&self, agent_id: AgentId) -> Result<Vec<Lead>, RepositoryError> {
        let assignments = self.store.assignments_for_agent(agent_id).await?;
        Ok(assignments.into_iter().map(|a| a.lead).collect())
    }

    /// Assignments held by `agent_id`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn assignments_by_recipient(
        &self,
        agent_id: AgentId,
    ) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        self.store.assignments_for_agent(agent_id).await
    }

    /// Every assignment, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn all(&self) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        self.store.all_assignments().await
    }

    /// Leads grouped by the agent holding them.
    ///
    /// Groups follow agent creation order and agents holding nothing are
    /// left out. Within a group the most recent assignment comes first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn grouped_by_recipient(&self) -> Result<Vec<RecipientGroup>, RepositoryError> {
        let roster = self.store.assignment_counts().await?;
        let assignments = self.store.all_assignments().await?;

        let mut items: HashMap<AgentId, Vec<GroupedLead>> = HashMap::new();
        for assignment in assignments {
            items
                .entry(assignment.recipient.id)
                .or_default()
                .push(GroupedLead {
                    lead_id: assignment.lead.id,
                    first_name: assignment.lead.first_name,
                    phone: assignment.lead.phone,
                    notes: assignment.lead.notes,
                    assigned_at: assignment.created_at,
                });
        }

        Ok(roster
            .into_iter()
            .filter_map(|entry| {
                let items = items.remove(&entry.recipient.id)?;
                Some(RecipientGroup {
                    recipient: entry.recipient,
                    items,
                })
            })
            .collect())
    }

    /// Roster-wide totals, with a count for every agent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn stats(&self) -> Result<AssignmentStats, RepositoryError> {
        let agent_stats = self.store.assignment_counts().await?;
        let total_leads = self.store.count_leads().await?;

        Ok(AssignmentStats {
            total_assignments: agent_stats.iter().map(|entry| entry.assigned_count).sum(),
            total_leads,
            total_agents: i64::try_from(agent_stats.len()).unwrap_or(i64::MAX),
            agent_stats,
        })
    }
}
