use thiserror::Error;

use crate::types::Kind;

/// A text value that could not be read as the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {expected} value {value:?}: {reason}")]
pub struct InferError {
    pub expected: Kind,
    pub value: String,
    pub reason: String,
}

impl InferError {
    pub fn new(expected: Kind, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expected,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by [`Registry`](crate::Registry) and by generated configuration code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// An environment override could not be converted to the declared kind.
    #[error("invalid value {value:?} for env {name}: {reason}")]
    Conversion { name: String, value: String, reason: String },
    /// A required variable resolved to its kind's empty value.
    #[error("could not set {name}")]
    Validation { name: String },
    #[error("env {name} is not registered")]
    Unknown { name: String },
    #[error("env {name} holds a {actual} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl EnvError {
    pub fn conversion(name: impl Into<String>, err: InferError) -> Self {
        EnvError::Conversion {
            name: name.into(),
            value: err.value,
            reason: err.reason,
        }
    }

    /// Validation failure for a variable left empty after parsing.
    pub fn empty(name: impl Into<String>) -> Self {
        EnvError::Validation { name: name.into() }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        EnvError::Unknown { name: name.into() }
    }

    pub fn type_mismatch(name: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        EnvError::TypeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// The variable name the error refers to.
    pub fn name(&self) -> &str {
        match self {
            EnvError::Conversion { name, .. }
            | EnvError::Validation { name }
            | EnvError::Unknown { name }
            | EnvError::TypeMismatch { name, .. } => name,
        }
    }
}
