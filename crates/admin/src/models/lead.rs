//! Lead and assignment domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use leaddesk_core::{AgentId, AssignmentId, LeadId};

use super::Recipient;

/// A persisted contact record.
///
/// Leads are only ever created by an upload and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// The link recording which agent received which lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub agent_id: AgentId,
    pub lead_id: LeadId,
    pub created_at: DateTime<Utc>,
}

/// An assignment with both endpoints resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentDetail {
    pub id: AssignmentId,
    pub recipient: Recipient,
    pub lead: Lead,
    pub created_at: DateTime<Utc>,
}

/// Per-agent assignment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAssignmentCount {
    pub recipient: Recipient,
    pub assigned_count: i64,
}

/// Totals across the whole roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentStats {
    pub total_assignments: i64,
    pub total_leads: i64,
    pub total_agents: i64,
    /// Every agent, including those with no assignment, in creation order.
    pub agent_stats: Vec<AgentAssignmentCount>,
}
