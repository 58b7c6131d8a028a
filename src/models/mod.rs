mod submission;

pub use submission::{PersistedSubmission, SubmissionDraft};
