//! Error types for schema construction and row encoding.

use crate::types::DataType;

/// Errors raised while building or querying a [`Schema`](crate::schema::Schema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
    #[error("schema must contain at least one key column")]
    NoKeyColumns,
    #[error("key column {name} must precede all non-key columns")]
    KeyColumnOutOfOrder { name: String },
    #[error("key column {name} must not be nullable")]
    NullableKeyColumn { name: String },
    #[error("column not found: {name}")]
    UnknownColumn { name: String },
    #[error("{num_columns} column ids starting at {first_id} overflow u32")]
    ColumnIdOverflow { first_id: u32, num_columns: usize },
}

/// Errors raised while populating, encoding, or decoding partial rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("column not found: {name}")]
    UnknownColumn { name: String },
    #[error("invalid type {actual} for column {name} of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("column {name} is not nullable")]
    NotNullable { name: String },
    #[error("malformed row operations: {reason}")]
    Malformed { reason: String },
}

impl RowError {
    pub(crate) fn type_mismatch(name: &str, expected: DataType, actual: DataType) -> Self {
        Self::TypeMismatch {
            name: name.to_string(),
            expected: expected.name(),
            actual: actual.name(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
