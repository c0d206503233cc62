//! Partial rows: a schema plus a sparse set of cell assignments.
//!
//! A column in a [`PartialRow`] is in one of three states: unset, set to
//! NULL, or set to a value. Range partition bounds rely on the unset state
//! to express an unbounded prefix of the key.

use std::sync::Arc;

use crate::error::RowError;
use crate::schema::Schema;
use crate::types::Value;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Unset,
    Null,
    Set(Value),
}

/// A row whose columns may be individually set, set to NULL, or left unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRow {
    schema: Arc<Schema>,
    cells: Vec<Cell>,
}

impl PartialRow {
    /// Creates a row with every column unset.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let cells = vec![Cell::Unset; schema.num_columns()];
        Self { schema, cells }
    }

    /// The schema this row is bound to.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Sets the named column to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::UnknownColumn`] if the column does not exist and
    /// [`RowError::TypeMismatch`] if `value` does not match the column type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, RowError> {
        let value = value.into();
        let idx = self.index_of(name)?;
        let col = &self.schema.columns()[idx];
        if value.data_type() != col.data_type {
            return Err(RowError::type_mismatch(
                name,
                col.data_type,
                value.data_type(),
            ));
        }
        self.cells[idx] = Cell::Set(value);
        Ok(self)
    }

    /// Sets the named column to NULL.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::NotNullable`] for non-nullable columns.
    pub fn set_null(&mut self, name: &str) -> Result<&mut Self, RowError> {
        let idx = self.index_of(name)?;
        if !self.schema.columns()[idx].is_nullable {
            return Err(RowError::NotNullable {
                name: name.to_string(),
            });
        }
        self.cells[idx] = Cell::Null;
        Ok(self)
    }

    /// Returns the named column to the unset state.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::UnknownColumn`] if the column does not exist.
    pub fn unset(&mut self, name: &str) -> Result<&mut Self, RowError> {
        let idx = self.index_of(name)?;
        self.cells[idx] = Cell::Unset;
        Ok(self)
    }

    /// Whether the column at `idx` has been set (to a value or to NULL).
    #[must_use]
    pub fn is_set(&self, idx: usize) -> bool {
        matches!(self.cells.get(idx), Some(Cell::Null | Cell::Set(_)))
    }

    /// Whether the column at `idx` has been set to NULL.
    #[must_use]
    pub fn is_null(&self, idx: usize) -> bool {
        matches!(self.cells.get(idx), Some(Cell::Null))
    }

    /// The value of the column at `idx`, if set to a non-NULL value.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        match self.cells.get(idx) {
            Some(Cell::Set(v)) => Some(v),
            _ => None,
        }
    }

    /// The value of the named column, if set to a non-NULL value.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.schema.find_column(name).and_then(|idx| self.get(idx))
    }

    /// Number of columns that are set, NULL included.
    #[must_use]
    pub fn num_set(&self) -> usize {
        self.cells.iter().filter(|c| !matches!(c, Cell::Unset)).count()
    }

    // Decoder hook: installs a cell without the type checks in `set`.
    pub(crate) fn put_decoded(&mut self, idx: usize, value: Option<Value>) {
        self.cells[idx] = value.map_or(Cell::Null, Cell::Set);
    }

    fn index_of(&self, name: &str) -> Result<usize, RowError> {
        self.schema
            .find_column(name)
            .ok_or_else(|| RowError::UnknownColumn {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;
    use crate::types::DataType;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                ColumnSchema::key("id", DataType::Int32),
                ColumnSchema::new("name", DataType::String),
            ])
            .expect("valid schema"),
        )
    }

    #[test]
    fn new_row_is_fully_unset() {
        let row = schema().new_partial_row();
        assert_eq!(row.num_set(), 0);
        assert!(!row.is_set(0));
        assert!(!row.is_set(1));
    }

    #[test]
    fn set_and_get() {
        let mut row = schema().new_partial_row();
        row.set("id", 7).expect("set id");
        assert!(row.is_set(0));
        assert_eq!(row.get(0), Some(&Value::Int32(7)));
        assert_eq!(row.get_by_name("id"), Some(&Value::Int32(7)));
    }

    #[test]
    fn set_rejects_wrong_type() {
        let mut row = schema().new_partial_row();
        let err = row.set("id", 7i64).unwrap_err();
        assert_eq!(
            err,
            RowError::TypeMismatch {
                name: "id".to_string(),
                expected: "int32",
                actual: "int64",
            }
        );
    }

    #[test]
    fn set_rejects_unknown_column() {
        let mut row = schema().new_partial_row();
        assert!(matches!(
            row.set("nope", 1),
            Err(RowError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn null_only_for_nullable_columns() {
        let mut row = schema().new_partial_row();
        row.set_null("name").expect("name is nullable");
        assert!(row.is_set(1));
        assert!(row.is_null(1));
        assert_eq!(row.get(1), None);
        assert_eq!(
            row.set_null("id").unwrap_err(),
            RowError::NotNullable {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn unset_clears_cell() {
        let mut row = schema().new_partial_row();
        row.set("id", 1).expect("set").unset("id").expect("unset");
        assert_eq!(row.num_set(), 0);
    }
}
