use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// In-progress contact form values, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(alias = "propertyAddress")]
    pub property_address: String,
    pub message: String,
}

impl SubmissionDraft {
    /// Reset every field to empty, as after a successful submission.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A validated, stamped contact submission as written to a store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct PersistedSubmission {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub property_address: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl PersistedSubmission {
    pub fn from_draft(draft: &SubmissionDraft, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            email: draft.email.clone(),
            property_address: draft.property_address.clone(),
            message: draft.message.clone(),
            created_at,
        }
    }
}
