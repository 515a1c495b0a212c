//! Upload-to-assignment pipeline.
//!
//! [`DistributionCoordinator::upload_and_distribute`] runs one upload through
//! five stages:
//!
//! 1. parse the staged file into [`LeadRecord`]s
//! 2. load every agent, oldest first
//! 3. split the records round-robin, one bucket per agent
//! 4. write a lead and its assignment for every record inside one transaction
//! 5. remove the staged file
//!
//! Stage 5 runs whatever happened before it, and the error that stopped the
//! pipeline is returned unchanged. Nothing from a failed upload is committed.
//!
//! Agents are read before the transaction opens. An agent created or deleted
//! between that read and the commit is not reconciled.

use std::future::Future;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use leaddesk_core::{AgentId, LeadId, LeadRecord, distribute};

use crate::db::RepositoryError;
use crate::ingest::{self, ParseError};
use crate::models::{Assignment, AssignmentDetail, Lead, Recipient};
use crate::services::uploads::UploadedFile;

// =============================================================================
// Storage seams
// =============================================================================

/// Read access to the agents that can receive leads.
pub trait RecipientDirectory {
    /// Every agent, ordered by creation time (oldest first, then by id).
    fn list_all_recipients(
        &self,
    ) -> impl Future<Output = Result<Vec<Recipient>, RepositoryError>> + Send;
}

/// An open write transaction for one upload.
///
/// Dropping it without [`LeadTransaction::commit`] discards every write.
pub trait LeadTransaction: Send {
    /// Insert a lead.
    fn create_lead(
        &mut self,
        record: &LeadRecord,
    ) -> impl Future<Output = Result<Lead, RepositoryError>> + Send;

    /// Link a lead to the agent that receives it.
    fn create_assignment(
        &mut self,
        agent_id: AgentId,
        lead_id: LeadId,
    ) -> impl Future<Output = Result<Assignment, RepositoryError>> + Send;

    /// Make every write visible at once.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Opens write transactions.
pub trait LeadStore {
    type Tx: LeadTransaction;

    /// Start a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RepositoryError>> + Send;
}

// =============================================================================
// Errors
// =============================================================================

/// Stable, machine-readable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedFormat,
    NoValidData,
    NoRecipients,
    PersistenceFailure,
    UnreadableUpload,
    StorageUnavailable,
}

impl ErrorKind {
    /// The wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::NoValidData => "NO_VALID_DATA",
            Self::NoRecipients => "NO_RECIPIENTS",
            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
            Self::UnreadableUpload => "UNREADABLE_UPLOAD",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an upload was not distributed.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// The file could not be turned into records.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// There is nobody to hand leads to.
    #[error("no agents available: create at least one agent before uploading leads")]
    NoRecipients,

    /// The agent list could not be read.
    #[error("could not load agents: {0}")]
    RecipientLookup(#[source] RepositoryError),

    /// Writing leads failed; nothing from the upload was stored.
    #[error("could not save leads, nothing from this upload was stored: {0}")]
    Persistence(#[source] RepositoryError),
}

impl DistributionError {
    /// The failure category reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(ParseError::UnsupportedFormat { .. }) => ErrorKind::UnsupportedFormat,
            Self::Parse(ParseError::NoValidData) => ErrorKind::NoValidData,
            Self::Parse(ParseError::Io(_)) => ErrorKind::UnreadableUpload,
            Self::NoRecipients => ErrorKind::NoRecipients,
            Self::RecipientLookup(_) => ErrorKind::StorageUnavailable,
            Self::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// How many leads one agent received from an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientShare {
    pub recipient: Recipient,
    pub assigned_count: usize,
}

/// Outcome of a committed upload.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    pub total_records: usize,
    pub total_recipients: usize,
    /// One entry per agent, in agent order, including agents that got none.
    pub per_recipient_counts: Vec<RecipientShare>,
    /// Created assignments in write order.
    pub assignments: Vec<AssignmentDetail>,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs uploads through parse, distribute and persist.
pub struct DistributionCoordinator<S> {
    store: S,
}

impl<S> DistributionCoordinator<S>
where
    S: RecipientDirectory + LeadStore + Sync,
{
    /// Create a coordinator over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Distribute an uploaded lead file across all agents.
    ///
    /// The file is removed before this returns, on success and on every
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns a [`DistributionError`]; see [`DistributionError::kind`].
    pub async fn upload_and_distribute(
        &self,
        upload: UploadedFile,
    ) -> Result<DistributionSummary, DistributionError> {
        let outcome = self.distribute_file(upload.path()).await;

        let path = upload.path().to_owned();
        if let Err(err) = upload.discard().await {
            tracing::warn!(error = %err, path = %path.display(), "failed to remove upload");
        }

        match &outcome {
            Ok(summary) => tracing::info!(
                path = %path.display(),
                records = summary.total_records,
                recipients = summary.total_recipients,
                "distributed upload"
            ),
            Err(err) => tracing::warn!(
                path = %path.display(),
                kind = %err.kind(),
                error = %err,
                "upload not distributed"
            ),
        }

        outcome
    }

    async fn distribute_file(&self, path: &Path) -> Result<DistributionSummary, DistributionError> {
        let records = ingest::parse_upload(path).await?;
        tracing::debug!(path = %path.display(), records = records.len(), "parsed upload");

        let recipients = self
            .store
            .list_all_recipients()
            .await
            .map_err(DistributionError::RecipientLookup)?;
        let bucket_count =
            NonZeroUsize::new(recipients.len()).ok_or(DistributionError::NoRecipients)?;

        let total_records = records.len();
        let buckets = distribute(records, bucket_count);

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(DistributionError::Persistence)?;
        let mut assignments = Vec::with_capacity(total_records);
        let mut per_recipient_counts = Vec::with_capacity(recipients.len());

        for (recipient, bucket) in recipients.iter().zip(buckets) {
            per_recipient_counts.push(RecipientShare {
                recipient: recipient.clone(),
                assigned_count: bucket.len(),
            });

            for record in &bucket {
                let lead = tx
                    .create_lead(record)
                    .await
                    .map_err(DistributionError::Persistence)?;
                let assignment = tx
                    .create_assignment(recipient.id, lead.id)
                    .await
                    .map_err(DistributionError::Persistence)?;

                assignments.push(AssignmentDetail {
                    id: assignment.id,
                    recipient: recipient.clone(),
                    lead,
                    created_at: assignment.created_at,
                });
            }
        }

        tx.commit().await.map_err(DistributionError::Persistence)?;

        Ok(DistributionSummary {
            total_records,
            total_recipients: recipients.len(),
            per_recipient_counts,
            assignments,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::testing::MemoryStore;

    const FIVE_LEADS: &[u8] = b"FirstName,Phone,Notes\n\
        Ada,555-0001,a\n\
        Grace,555-0002,\n\
        Lin,555-0003,c\n\
        Alan,555-0004,\n\
        Joan,555-0005,e\n";

    fn stage(dir: &TempDir, name: &str, contents: &[u8]) -> (UploadedFile, PathBuf) {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        (UploadedFile::adopt(path.clone()), path)
    }

    fn counts(summary: &DistributionSummary) -> Vec<usize> {
        summary
            .per_recipient_counts
            .iter()
            .map(|share| share.assigned_count)
            .collect()
    }

    #[tokio::test]
    async fn test_five_records_two_agents() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah", "Mike"]);
        let (upload, path) = stage(&dir, "leads.csv", FIVE_LEADS);

        let summary = DistributionCoordinator::new(store.clone())
            .upload_and_distribute(upload)
            .await
            .unwrap();

        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.total_recipients, 2);
        assert_eq!(counts(&summary), vec![3, 2]);
        assert_eq!(summary.per_recipient_counts[0].recipient.name, "Sarah");
        assert_eq!(summary.assignments.len(), 5);
        assert_eq!(store.lead_count(), 5);
        assert_eq!(store.assignment_count(), 5);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_writes_follow_bucket_order() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah", "Mike"]);
        let (upload, _) = stage(&dir, "leads.csv", FIVE_LEADS);

        let summary = DistributionCoordinator::new(store)
            .upload_and_distribute(upload)
            .await
            .unwrap();

        let written: Vec<(&str, &str)> = summary
            .assignments
            .iter()
            .map(|a| (a.recipient.name.as_str(), a.lead.first_name.as_str()))
            .collect();
        assert_eq!(
            written,
            vec![
                ("Sarah", "Ada"),
                ("Sarah", "Lin"),
                ("Sarah", "Joan"),
                ("Mike", "Grace"),
                ("Mike", "Alan"),
            ]
        );
        assert!(summary.assignments.windows(2).all(|w| w[0].lead.id < w[1].lead.id));
    }

    #[tokio::test]
    async fn test_two_records_five_agents() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["A1", "A2", "A3", "A4", "A5"]);
        let (upload, path) = stage(&dir, "leads.csv", b"FirstName,Phone\nAda,1\nGrace,2\n");

        let summary = DistributionCoordinator::new(store)
            .upload_and_distribute(upload)
            .await
            .unwrap();

        assert_eq!(counts(&summary), vec![1, 1, 0, 0, 0]);
        assert_eq!(summary.total_recipients, 5);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_no_agents_fails_and_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let (upload, path) = stage(&dir, "leads.csv", FIVE_LEADS);

        let err = DistributionCoordinator::new(store.clone())
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoRecipients);
        assert_eq!(store.lead_count(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_header_only_fails_and_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah"]);
        let (upload, path) = stage(&dir, "leads.csv", b"FirstName,Phone,Notes\n");

        let err = DistributionCoordinator::new(store.clone())
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoValidData);
        assert_eq!(store.lead_count(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unsupported_format_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah"]);
        let (upload, path) = stage(&dir, "leads.txt", FIVE_LEADS);

        let err = DistributionCoordinator::new(store)
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable_upload() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah"]);
        let upload = UploadedFile::adopt(dir.path().join("vanished.csv"));

        let err = DistributionCoordinator::new(store)
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnreadableUpload);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_whole_upload() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah", "Mike"]);
        let sarah = store.recipients()[0].id;

        let (first, _) = stage(&dir, "first.csv", b"FirstName,Phone\nEarly,1\n");
        DistributionCoordinator::new(store.clone())
            .upload_and_distribute(first)
            .await
            .unwrap();
        assert_eq!(store.assignments_for(sarah), 1);

        let failing = store.clone().failing_on_lead(3);
        let (upload, path) = stage(&dir, "leads.csv", FIVE_LEADS);
        let err = DistributionCoordinator::new(failing)
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(store.assignments_for(sarah), 1);
        assert_eq!(store.lead_count(), 1);
        assert_eq!(store.assignment_count(), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah"]).failing_on_commit();
        let (upload, path) = stage(&dir, "leads.csv", FIVE_LEADS);

        let err = DistributionCoordinator::new(store.clone())
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(store.lead_count(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_agent_lookup_failure_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_agents(&["Sarah"]).failing_on_lookup();
        let (upload, path) = stage(&dir, "leads.csv", FIVE_LEADS);

        let err = DistributionCoordinator::new(store)
            .upload_and_distribute(upload)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert!(!path.exists());
    }

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(DistributionError::NoRecipients.kind().as_str(), "NO_RECIPIENTS");
        assert_eq!(
            serde_json::to_string(&ErrorKind::PersistenceFailure).unwrap(),
            "\"PERSISTENCE_FAILURE\""
        );
        assert_eq!(
            DistributionError::from(ParseError::NoValidData).kind(),
            ErrorKind::NoValidData
        );
    }

    #[test]
    fn test_parse_error_message_is_kept() {
        let err = DistributionError::from(ParseError::NoValidData);
        assert_eq!(err.to_string(), ParseError::NoValidData.to_string());
    }
}
