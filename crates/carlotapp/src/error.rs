use crate::model::{Id, LookupKind};
use std::fmt;
use thiserror::Error;

/// A single field that failed validation before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum CarlotError {
    #[error("Failed to fetch {kind}: {message}")]
    Fetch { kind: LookupKind, message: String },

    #[error("Invalid form: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Tier {0} does not exist")]
    InvalidTier(usize),

    #[error("Tier {0} cannot be selected before the tiers above it")]
    TierSkipped(usize),

    #[error("Options for tier {0} are not loaded")]
    TierNotLoaded(usize),

    #[error("Option {id} is not available at tier {tier}")]
    UnknownOption { tier: usize, id: Id },

    #[error("Invalid value {value:?} for filter {key}: {reason}")]
    InvalidFilter {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown filter: {0}")]
    UnknownFilterKey(String),

    #[error("The comparison board already holds {0} cars")]
    CompareFull(usize),

    #[error("No comparison slot at position {0}")]
    UnknownSlot(usize),

    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CarlotError {
    pub fn fetch(kind: LookupKind, message: impl Into<String>) -> Self {
        Self::Fetch {
            kind,
            message: message.into(),
        }
    }

    /// True for errors that come from the network boundary rather than caller input.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Submission(_))
    }
}

pub type Result<T> = std::result::Result<T, CarlotError>;
