use thiserror::Error;

use crate::range::Violation;
use crate::token::Location;
use crate::types::Shape;

/// Broad class of a [`TdrpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Type,
    Cardinality,
    Range,
    Options,
}

#[derive(Debug, Error)]
pub enum TdrpError {
    #[error("Param '{label}': {message} ({location})")]
    Syntax {
        label: String,
        message: String,
        location: Location,
    },

    #[error("Param '{label}': cannot decode '{text}' as {expected} ({location})")]
    Type {
        label: String,
        text: String,
        expected: String,
        location: Location,
    },

    /// A deferred value that still failed to decode once its references
    /// were expanded. The source token is no longer known.
    #[error("Param '{label}': cannot decode '{text}' as {expected} after env expansion")]
    Unresolved {
        label: String,
        text: String,
        expected: String,
    },

    #[error("Param '{label}': {what} has {found} elements, expected {expected} ({location})")]
    Cardinality {
        label: String,
        what: String,
        expected: usize,
        found: usize,
        location: Location,
    },

    #[error("Param '{label}' is a {actual}, cannot be read as a {requested}")]
    WrongShape {
        label: String,
        actual: Shape,
        requested: Shape,
    },

    #[error("{} value(s) out of range", .0.len())]
    OutOfRange(Vec<Violation>),

    #[error("{} parameter(s) failed to load", .0.len())]
    Multiple(Vec<TdrpError>),

    #[error("Load options error: {0}")]
    Options(#[from] confique::Error),

    #[error("Failed to parse load options: {source}")]
    OptionsParse { source: toml::de::Error },
}

impl TdrpError {
    pub(crate) fn syntax(label: &str, message: impl Into<String>, location: Location) -> Self {
        TdrpError::Syntax {
            label: label.to_string(),
            message: message.into(),
            location,
        }
    }

    pub(crate) fn cardinality(
        label: &str,
        what: impl Into<String>,
        expected: usize,
        found: usize,
        location: Location,
    ) -> Self {
        TdrpError::Cardinality {
            label: label.to_string(),
            what: what.into(),
            expected,
            found,
            location,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TdrpError::Syntax { .. } | TdrpError::WrongShape { .. } => ErrorCategory::Syntax,
            TdrpError::Type { .. } | TdrpError::Unresolved { .. } => ErrorCategory::Type,
            TdrpError::Cardinality { .. } => ErrorCategory::Cardinality,
            TdrpError::OutOfRange(_) => ErrorCategory::Range,
            TdrpError::Options(_) | TdrpError::OptionsParse { .. } => ErrorCategory::Options,
            TdrpError::Multiple(errors) => errors
                .first()
                .map(TdrpError::category)
                .unwrap_or(ErrorCategory::Syntax),
        }
    }

    /// Source location, for errors that came from a token.
    pub fn location(&self) -> Option<Location> {
        match self {
            TdrpError::Syntax { location, .. }
            | TdrpError::Type { location, .. }
            | TdrpError::Cardinality { location, .. } => Some(*location),
            _ => None,
        }
    }
}
