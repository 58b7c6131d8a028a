use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::models::{PersistedSubmission, SubmissionDraft};
use crate::store::{StorageError, SubmissionStore};

use super::fields::{self, ValidationErrors};
use super::identifier;

/// Result of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The record was written. Callers should clear the draft.
    Success(PersistedSubmission),
    /// The draft was rejected before anything was written.
    ValidationFailed(ValidationErrors),
    /// The store refused the write. The draft is untouched so it can be resent.
    StorageFailed(StorageError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success(_))
    }

    pub fn state(&self) -> AttemptState {
        match self {
            SubmitOutcome::Success(_) => AttemptState::Succeeded,
            SubmitOutcome::ValidationFailed(_) => AttemptState::Rejected,
            SubmitOutcome::StorageFailed(_) => AttemptState::Failed,
        }
    }
}

/// Lifecycle of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Validating,
    Rejected,
    Persisting,
    Succeeded,
    Failed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Rejected | AttemptState::Succeeded | AttemptState::Failed
        )
    }
}

/// Validates drafts and writes accepted ones through the configured store.
pub struct SubmissionPipeline {
    store: Arc<dyn SubmissionStore>,
    min_latency: Duration,
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self {
            store,
            min_latency: Duration::ZERO,
        }
    }

    /// Pad successful submissions so they take at least `latency`.
    pub fn with_min_latency(mut self, latency: Duration) -> Self {
        self.min_latency = latency;
        self
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn validate(&self, draft: &SubmissionDraft) -> ValidationErrors {
        fields::validate(draft)
    }

    pub async fn submit(&self, draft: &SubmissionDraft) -> SubmitOutcome {
        let mut state = AttemptState::Idle;
        advance(&mut state, AttemptState::Validating);

        let errors = fields::validate(draft);
        if !errors.is_empty() {
            advance(&mut state, AttemptState::Rejected);
            return SubmitOutcome::ValidationFailed(errors);
        }

        advance(&mut state, AttemptState::Persisting);
        let record = PersistedSubmission::from_draft(draft, identifier::generate(), Utc::now());
        let id = record.id;

        if let Err(e) = self.store.append(record.clone()).await {
            advance(&mut state, AttemptState::Failed);
            tracing::error!("Failed to store submission {id} in {} store: {e}", self.store.name());
            return SubmitOutcome::StorageFailed(e);
        }

        if !self.min_latency.is_zero() {
            tokio::time::sleep(self.min_latency).await;
        }

        advance(&mut state, AttemptState::Succeeded);
        tracing::info!("Stored submission {id} in {} store", self.store.name());
        SubmitOutcome::Success(record)
    }
}

fn advance(state: &mut AttemptState, next: AttemptState) {
    tracing::debug!("Submission attempt {:?} -> {:?}", state, next);
    *state = next;
}
