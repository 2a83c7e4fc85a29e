//! Error taxonomy for the alert core.
//!
//! Validation errors surface at configuration construction/update time only;
//! a gate rejecting a tender is a normal `matched: false` outcome, never an
//! error, and a tender missing a field required by an active gate degrades to
//! a non-match.

use thiserror::Error;

/// Result type alias for store and configuration operations.
pub type Result<T> = std::result::Result<T, AlertError>;

/// Errors from store and configuration management.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("alert configuration not found: {0}")]
    NotFound(String),
}

/// An alert configuration violating one of its invariants.
///
/// Messages mirror the portal's form errors so the web layer can surface them
/// verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Alert name is required")]
    EmptyName,

    #[error("Name cannot exceed 100 characters")]
    NameTooLong,

    #[error("Description cannot exceed 500 characters")]
    DescriptionTooLong,

    #[error("At least one keyword is required")]
    NoKeywords,

    #[error("Maximum 20 keywords allowed")]
    TooManyKeywords,

    #[error("Keyword is required")]
    EmptyKeywordTerm,

    #[error("Keyword cannot exceed 50 characters: {0:?}")]
    KeywordTooLong(String),

    #[error("Maximum 10 categories allowed")]
    TooManyCategories,

    #[error("Maximum 10 exclude keywords allowed")]
    TooManyExcludeKeywords,

    #[error("Exclude keyword cannot exceed 50 characters: {0:?}")]
    ExcludeKeywordTooLong(String),

    #[error("Value bounds must not be negative")]
    NegativeValueBound,

    #[error("Minimum value cannot be greater than maximum value")]
    ValueRangeInverted,

    #[error("Days until closing must be between 0 and 365")]
    DaysOutOfRange,

    #[error("Minimum days cannot be greater than maximum days")]
    DaysRangeInverted,

    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("Invalid time format: {0:?}")]
    InvalidSummaryTime(String),
}
