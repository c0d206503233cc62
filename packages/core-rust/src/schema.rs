use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::row::PartialRow;
use crate::types::{CompressionType, DataType, Encoding, Value};

/// Definition of a single column within a table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Name of the column, unique within its schema.
    pub name: String,
    /// Physical type of the column's cells.
    pub data_type: DataType,
    /// Whether cells may be NULL. Key columns are never nullable.
    pub is_nullable: bool,
    /// Whether this column is part of the primary key.
    pub is_key: bool,
    /// Server-assigned column id. Client-built schemas carry none.
    pub id: Option<u32>,
    /// Default returned for rows written before the column existed.
    pub read_default: Option<Value>,
    /// Default applied to new rows that do not set the column.
    pub write_default: Option<Value>,
    pub encoding: Encoding,
    pub compression: CompressionType,
    /// Storage block size in bytes; `None` uses the server default.
    pub block_size: Option<i32>,
    pub comment: Option<String>,
}

impl ColumnSchema {
    /// Creates a nullable, non-key column with default storage attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_nullable: true,
            is_key: false,
            id: None,
            read_default: None,
            write_default: None,
            encoding: Encoding::default(),
            compression: CompressionType::default(),
            block_size: None,
            comment: None,
        }
    }

    /// Creates a non-nullable primary key column.
    #[must_use]
    pub fn key(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            is_nullable: false,
            is_key: true,
            ..Self::new(name, data_type)
        }
    }

    /// Marks the column as non-nullable.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }
}

/// A table schema: an ordered list of columns with the key columns first.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    num_key_columns: usize,
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, validating column name uniqueness and key layout.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a name repeats, no key column exists, a key
    /// column follows a non-key column, or a key column is nullable.
    pub fn new(columns: Vec<ColumnSchema>) -> Result<Self, SchemaError> {
        let mut name_to_index = HashMap::with_capacity(columns.len());
        let mut num_key_columns = 0;
        let mut seen_non_key = false;

        for (idx, col) in columns.iter().enumerate() {
            if name_to_index.insert(col.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    name: col.name.clone(),
                });
            }
            if col.is_key {
                if seen_non_key {
                    return Err(SchemaError::KeyColumnOutOfOrder {
                        name: col.name.clone(),
                    });
                }
                if col.is_nullable {
                    return Err(SchemaError::NullableKeyColumn {
                        name: col.name.clone(),
                    });
                }
                num_key_columns += 1;
            } else {
                seen_non_key = true;
            }
        }

        if num_key_columns == 0 {
            return Err(SchemaError::NoKeyColumns);
        }

        Ok(Self {
            columns,
            num_key_columns,
            name_to_index,
        })
    }

    /// Assigns sequential column ids starting at `first_id`, as the master
    /// does for stored schemas.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ColumnIdOverflow`] if the last id would not fit in a `u32`.
    pub fn with_column_ids(mut self, first_id: u32) -> Result<Self, SchemaError> {
        let num_columns = self.columns.len();
        let overflow = || SchemaError::ColumnIdOverflow {
            first_id,
            num_columns,
        };
        let count = u32::try_from(num_columns).map_err(|_| overflow())?;
        if count > 0 {
            first_id.checked_add(count - 1).ok_or_else(overflow)?;
        }
        for (offset, col) in (0..count).zip(self.columns.iter_mut()) {
            col.id = Some(first_id + offset);
        }
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn num_key_columns(&self) -> usize {
        self.num_key_columns
    }

    /// Returns the column at `idx`, if any.
    #[must_use]
    pub fn column(&self, idx: usize) -> Option<&ColumnSchema> {
        self.columns.get(idx)
    }

    /// Returns the index of the named column, if present.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumn`] if no column has that name.
    pub fn column_by_name(&self, name: &str) -> Result<&ColumnSchema, SchemaError> {
        self.find_column(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| SchemaError::UnknownColumn {
                name: name.to_string(),
            })
    }

    /// Whether any column is nullable. Determines if encoded rows carry a null bitmap.
    #[must_use]
    pub fn has_nullables(&self) -> bool {
        self.columns.iter().any(|c| c.is_nullable)
    }

    /// Creates an empty row bound to this schema.
    #[must_use]
    pub fn new_partial_row(self: &Arc<Self>) -> PartialRow {
        PartialRow::new(Arc::clone(self))
    }
}

/// A requested change to an existing column. Fields left `None` are unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSchemaDelta {
    /// Current name of the column being altered.
    pub name: String,
    pub new_name: Option<String>,
    pub default_value: Option<Value>,
    pub remove_default: bool,
    pub encoding: Option<Encoding>,
    pub compression: Option<CompressionType>,
    pub block_size: Option<i32>,
    pub new_comment: Option<String>,
}

impl ColumnSchemaDelta {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_schema() -> Schema {
        Schema::new(vec![
            ColumnSchema::key("id", DataType::Int32),
            ColumnSchema::new("name", DataType::String),
        ])
        .expect("valid schema")
    }

    #[test]
    fn finds_columns_by_name() {
        let schema = two_column_schema();
        assert_eq!(schema.num_columns(), 2);
        assert_eq!(schema.num_key_columns(), 1);
        assert_eq!(schema.find_column("name"), Some(1));
        assert_eq!(schema.find_column("missing"), None);
        assert_eq!(
            schema.column_by_name("missing"),
            Err(SchemaError::UnknownColumn {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Schema::new(vec![
            ColumnSchema::key("id", DataType::Int32),
            ColumnSchema::new("id", DataType::String),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn rejects_schema_without_key() {
        let err = Schema::new(vec![ColumnSchema::new("v", DataType::Int8)]).unwrap_err();
        assert_eq!(err, SchemaError::NoKeyColumns);
    }

    #[test]
    fn rejects_key_after_value_column() {
        let err = Schema::new(vec![
            ColumnSchema::key("a", DataType::Int32),
            ColumnSchema::new("b", DataType::Int32),
            ColumnSchema::key("c", DataType::Int32),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::KeyColumnOutOfOrder {
                name: "c".to_string()
            }
        );
    }

    #[test]
    fn rejects_nullable_key() {
        let mut col = ColumnSchema::key("a", DataType::Int32);
        col.is_nullable = true;
        assert_eq!(
            Schema::new(vec![col]).unwrap_err(),
            SchemaError::NullableKeyColumn {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn nullable_detection() {
        assert!(two_column_schema().has_nullables());
        let schema = Schema::new(vec![
            ColumnSchema::key("id", DataType::Int32),
            ColumnSchema::new("v", DataType::Int32).not_null(),
        ])
        .expect("valid schema");
        assert!(!schema.has_nullables());
    }

    #[test]
    fn column_ids_are_sequential() {
        let schema = two_column_schema().with_column_ids(10).expect("ids fit");
        let ids: Vec<_> = schema.columns().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(10), Some(11)]);
    }

    #[test]
    fn column_ids_must_fit_in_u32() {
        let last = two_column_schema().with_column_ids(u32::MAX - 1).expect("ids fit");
        assert_eq!(last.columns()[1].id, Some(u32::MAX));

        let err = two_column_schema().with_column_ids(u32::MAX).unwrap_err();
        assert_eq!(
            err,
            SchemaError::ColumnIdOverflow {
                first_id: u32::MAX,
                num_columns: 2
            }
        );
    }
}
