//! Errors returned while building or finalizing a table alteration.

use tabula_core::{RowError, SchemaError};

/// Crate-wide result alias.
pub type Result<T, E = AlterError> = std::result::Result<T, E>;

/// Errors produced by alteration building and request assembly.
///
/// `Clone` so an error recorded by a setter can be replayed when the
/// request is finalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlterError {
    #[error("invalid argument: {message}{}", column_suffix(.column.as_deref()))]
    InvalidArgument {
        message: String,
        column: Option<String>,
    },
    #[error("not supported: {message}: {column}")]
    NotSupported { message: String, column: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Row(#[from] RowError),
}

fn column_suffix(column: Option<&str>) -> String {
    column.map(|c| format!(": {c}")).unwrap_or_default()
}

impl AlterError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            column: None,
        }
    }

    pub(crate) fn invalid_column(message: impl Into<String>, column: &str) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            column: Some(column.to_string()),
        }
    }

    pub(crate) fn not_supported(message: impl Into<String>, column: &str) -> Self {
        Self::NotSupported {
            message: message.into(),
            column: column.to_string(),
        }
    }

    /// The column the error refers to, when it concerns a single column.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { column, .. } => column.as_deref(),
            Self::NotSupported { column, .. } => Some(column),
            Self::Schema(_) | Self::Row(_) => None,
        }
    }

    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    #[must_use]
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}
