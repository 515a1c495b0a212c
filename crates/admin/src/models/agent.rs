//! Agent domain types.
//!
//! Agents are the recipients of distributed leads. They are managed by
//! admins and only read by the distribution pipeline.

use chrono::{DateTime, Utc};
use phonenumber::Mode;
use serde::Serialize;
use thiserror::Error;

use leaddesk_core::{AgentId, Email, EmailError};

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;

/// A sales agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// The slice of an agent the distribution pipeline works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub id: AgentId,
    pub name: String,
    pub email: Email,
}

impl From<&Agent> for Recipient {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            email: agent.email.clone(),
        }
    }
}

/// An agent together with how many leads it currently holds.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    #[serde(flatten)]
    pub agent: Agent,
    pub assigned_count: i64,
}

/// Reasons an agent submission is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentValidationError {
    #[error("name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters")]
    Name,
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
    #[error("phone must be a valid number with a country code, e.g. +1 201 555 0123")]
    Phone,
}

/// A validated request to create an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub email: Email,
    pub phone: String,
}

impl NewAgent {
    /// Validate raw agent input.
    ///
    /// The phone is stored in E.164 form.
    ///
    /// # Errors
    ///
    /// Returns the first [`AgentValidationError`] the input violates.
    pub fn parse(name: &str, email: &str, phone: &str) -> Result<Self, AgentValidationError> {
        let name = name.trim();
        let name_len = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(AgentValidationError::Name);
        }

        let email = Email::parse(email)?;
        let phone = normalize_phone(phone).ok_or(AgentValidationError::Phone)?;

        Ok(Self {
            name: name.to_owned(),
            email,
            phone,
        })
    }
}

/// Validate an international phone number and render it as E.164.
///
/// The number must start with `+` and its country calling code; numbers
/// that are not valid for that country's numbering plan are rejected.
fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if !raw.starts_with('+') {
        return None;
    }

    let number = phonenumber::parse(None, raw).ok()?;
    phonenumber::is_valid(&number).then(|| number.format().mode(Mode::E164).to_string())
}
