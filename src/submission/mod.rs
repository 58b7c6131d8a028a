pub mod fields;
pub mod identifier;
pub mod metadata;
pub mod parser;
pub mod pipeline;

pub use fields::{Field, FieldError, ValidationErrors, validate};
pub use pipeline::{AttemptState, SubmissionPipeline, SubmitOutcome};
