//! In-memory store for service tests.
//!
//! Implements the same seams as [`crate::db::PgStore`]. Writes made through a
//! [`MemoryTx`] are buffered and only published by `commit`, so a dropped or
//! failed transaction leaves the store untouched. Failures can be injected on
//! the N-th lead write, on commit, or on the agent lookup.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use leaddesk_core::{AgentId, AssignmentId, Email, LeadId, LeadRecord};

use crate::db::RepositoryError;
use crate::models::{AgentAssignmentCount, Assignment, AssignmentDetail, Lead, Recipient};
use crate::services::assignments::AssignmentReader;
use crate::services::distribution::{LeadStore, LeadTransaction, RecipientDirectory};

#[derive(Debug, Default)]
struct State {
    recipients: Vec<Recipient>,
    leads: Vec<Lead>,
    assignments: Vec<Assignment>,
    next_lead_id: i32,
    next_assignment_id: i32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    lead_write: Option<usize>,
    commit: bool,
    lookup: bool,
}

fn injected() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::Protocol("injected failure".to_owned()))
}

/// Shared in-memory tables. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    faults: Faults,
}

impl MemoryStore {
    /// A store with one agent per name, created in order.
    pub fn with_agents(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.add_agent(name);
        }
        store
    }

    /// Add an agent and return it.
    pub fn add_agent(&self, name: &str) -> Recipient {
        let mut state = self.state.lock().unwrap();
        let id = AgentId::new(i32::try_from(state.recipients.len()).unwrap() + 1);
        let recipient = Recipient {
            id,
            name: name.to_owned(),
            email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
        };
        state.recipients.push(recipient.clone());
        recipient
    }

    /// Fail the `n`-th lead insert (1-based) of every transaction.
    pub fn failing_on_lead(mut self, n: usize) -> Self {
        self.faults.lead_write = Some(n);
        self
    }

    /// Fail every commit.
    pub fn failing_on_commit(mut self) -> Self {
        self.faults.commit = true;
        self
    }

    /// Fail the agent lookup.
    pub fn failing_on_lookup(mut self) -> Self {
        self.faults.lookup = true;
        self
    }

    pub fn recipients(&self) -> Vec<Recipient> {
        self.state.lock().unwrap().recipients.clone()
    }

    pub fn lead_count(&self) -> usize {
        self.state.lock().unwrap().leads.len()
    }

    pub fn assignment_count(&self) -> usize {
        self.state.lock().unwrap().assignments.len()
    }

    pub fn assignments_for(&self, agent_id: AgentId) -> usize {
        self.state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.agent_id == agent_id)
            .count()
    }

    fn details(&self, agent_id: Option<AgentId>) -> Vec<AssignmentDetail> {
        let state = self.state.lock().unwrap();
        let mut details: Vec<AssignmentDetail> = state
            .assignments
            .iter()
            .filter(|a| agent_id.is_none_or(|id| a.agent_id == id))
            .map(|a| AssignmentDetail {
                id: a.id,
                recipient: state
                    .recipients
                    .iter()
                    .find(|r| r.id == a.agent_id)
                    .cloned()
                    .unwrap(),
                lead: state.leads.iter().find(|l| l.id == a.lead_id).cloned().unwrap(),
                created_at: a.created_at,
            })
            .collect();
        details.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        details
    }
}

impl RecipientDirectory for MemoryStore {
    async fn list_all_recipients(&self) -> Result<Vec<Recipient>, RepositoryError> {
        if self.faults.lookup {
            return Err(injected());
        }
        Ok(self.recipients())
    }
}

/// A buffered transaction over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTx {
    state: Arc<Mutex<State>>,
    faults: Faults,
    started_at: DateTime<Utc>,
    leads: Vec<Lead>,
    assignments: Vec<Assignment>,
}

impl LeadStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, RepositoryError> {
        Ok(MemoryTx {
            state: Arc::clone(&self.state),
            faults: self.faults,
            started_at: Utc::now(),
            leads: Vec::new(),
            assignments: Vec::new(),
        })
    }
}

impl LeadTransaction for MemoryTx {
    async fn create_lead(&mut self, record: &LeadRecord) -> Result<Lead, RepositoryError> {
        if self.faults.lead_write == Some(self.leads.len() + 1) {
            return Err(injected());
        }

        // Ids are consumed even if the transaction rolls back, like a sequence.
        let id = {
            let mut state = self.state.lock().unwrap();
            state.next_lead_id += 1;
            LeadId::new(state.next_lead_id)
        };
        let lead = Lead {
            id,
            first_name: record.first_name().to_owned(),
            phone: record.phone().to_owned(),
            notes: record.notes().to_owned(),
            created_at: self.started_at,
        };
        self.leads.push(lead.clone());
        Ok(lead)
    }

    async fn create_assignment(
        &mut self,
        agent_id: AgentId,
        lead_id: LeadId,
    ) -> Result<Assignment, RepositoryError> {
        let id = {
            let mut state = self.state.lock().unwrap();
            if !state.recipients.iter().any(|r| r.id == agent_id) {
                return Err(RepositoryError::NotFound);
            }
            state.next_assignment_id += 1;
            AssignmentId::new(state.next_assignment_id)
        };
        let assignment = Assignment {
            id,
            agent_id,
            lead_id,
            created_at: self.started_at,
        };
        self.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        if self.faults.commit {
            return Err(injected());
        }
        let mut state = self.state.lock().unwrap();
        state.leads.extend(self.leads);
        state.assignments.extend(self.assignments);
        Ok(())
    }
}

impl AssignmentReader for MemoryStore {
    async fn assignments_for_agent(
        &self,
        agent_id: AgentId,
    ) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        Ok(self.details(Some(agent_id)))
    }

    async fn all_assignments(&self) -> Result<Vec<AssignmentDetail>, RepositoryError> {
        Ok(self.details(None))
    }

    async fn assignment_counts(&self) -> Result<Vec<AgentAssignmentCount>, RepositoryError> {
        Ok(self
            .recipients()
            .into_iter()
            .map(|recipient| AgentAssignmentCount {
                assigned_count: i64::try_from(self.assignments_for(recipient.id)).unwrap(),
                recipient,
            })
            .collect())
    }

    async fn count_leads(&self) -> Result<i64, RepositoryError> {
        Ok(i64::try_from(self.lead_count()).unwrap())
    }
}
