//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Validation errors carry the offending value so the
//! API layer can echo it back in 422 responses.

use thiserror::Error;

use crate::identity::PolicyId;

/// A value failed a format or length rule at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Policy IDs are positive integers.
    #[error("invalid policy id {0:?}: must be a positive integer")]
    InvalidPolicyId(String),

    /// Section numbers look like `1.0`, `12.0`.
    #[error("section number {0:?} must be in the format X.0 (e.g. '1.0')")]
    InvalidSectionNumber(String),

    /// Policy numbers look like `1.3`.
    #[error("invalid policy number {0:?}: expected <section>.<index>")]
    InvalidPolicyNumber(String),

    /// A policy number was paired with a section it does not belong to.
    #[error("policy number {number} must match the section {section} prefix")]
    SectionMismatch { number: String, section: String },

    /// A required text field was empty or whitespace.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// A text field exceeded its length limit.
    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Unknown review period label.
    #[error("unknown review period {0:?}")]
    InvalidReviewPeriod(String),

    /// Email addresses need a local part and a dotted domain.
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),

    /// Versions are `major.minor`.
    #[error("invalid version {0:?}: expected <major>.<minor>")]
    InvalidVersion(String),
}

/// A mutation of the [`crate::Handbook`] aggregate was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandbookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("section {0} not found")]
    SectionNotFound(String),

    #[error("policy {0} not found")]
    PolicyNotFound(PolicyId),

    #[error("section number {0} is already in use")]
    DuplicateSectionNumber(String),

    #[error("section title {0:?} is already in use")]
    DuplicateSectionTitle(String),

    #[error("policy id {0} is already in use")]
    DuplicatePolicyId(PolicyId),

    #[error("policy number {0} is already in use")]
    DuplicatePolicyNumber(String),

    #[error("section {0} has no policy numbers left")]
    SectionFull(String),

    #[error("no policy ids left")]
    PolicyIdsExhausted,
}

/// Check a required, length-limited text field.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_rejects_blank() {
        assert_eq!(
            require_text("title", "   ", 10),
            Err(ValidationError::Empty { field: "title" })
        );
    }

    #[test]
    fn require_text_counts_chars_not_bytes() {
        // Four two-byte characters fit in a limit of four.
        assert!(require_text("title", "éééé", 4).is_ok());
        assert!(require_text("title", "ééééé", 4).is_err());
    }

    #[test]
    fn validation_converts_into_handbook_error() {
        let err: HandbookError = ValidationError::InvalidSectionNumber("x".into()).into();
        assert!(matches!(err, HandbookError::Validation(_)));
        assert!(err.to_string().contains("X.0"));
    }
}
