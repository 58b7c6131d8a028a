use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::SubmissionDraft;

/// North-American number: optional parenthesized area code, optional `-`, `.` or space separators.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Phone,
    Email,
    PropertyAddress,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::PropertyAddress => "property_address",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    Required,
    InvalidFormat,
}

impl FieldError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::InvalidFormat => "invalid_format",
        }
    }

    /// Human-readable message shown next to the offending field.
    pub fn message(&self, field: Field) -> String {
        match (field, self) {
            (Field::Name, FieldError::Required) => "Name is required".to_string(),
            (Field::Phone, FieldError::Required) => "Phone number is required".to_string(),
            (Field::Phone, FieldError::InvalidFormat) => {
                "Please enter a valid phone number".to_string()
            }
            (Field::Email, FieldError::Required) => "Email is required".to_string(),
            (Field::Email, FieldError::InvalidFormat) => {
                "Please enter a valid email address".to_string()
            }
            (Field::PropertyAddress, FieldError::Required) => {
                "Property address is required".to_string()
            }
            (field, FieldError::Required) => format!("{field} is required"),
            (field, FieldError::InvalidFormat) => format!("{field} is invalid"),
        }
    }
}

/// Errors for the fields that are currently invalid. Empty means the draft passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    fn insert(&mut self, field: Field, error: FieldError) {
        self.0.insert(field, error);
    }
}

/// Check every field of a draft. All rules run, so each invalid field is reported at once.
pub fn validate(draft: &SubmissionDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if is_blank(&draft.name) {
        errors.insert(Field::Name, FieldError::Required);
    }

    if is_blank(&draft.phone) {
        errors.insert(Field::Phone, FieldError::Required);
    } else if !PHONE_RE.is_match(&draft.phone) {
        errors.insert(Field::Phone, FieldError::InvalidFormat);
    }

    if is_blank(&draft.email) {
        errors.insert(Field::Email, FieldError::Required);
    } else if !EMAIL_RE.is_match(&draft.email) {
        errors.insert(Field::Email, FieldError::InvalidFormat);
    }

    if is_blank(&draft.property_address) {
        errors.insert(Field::PropertyAddress, FieldError::Required);
    }

    errors
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
