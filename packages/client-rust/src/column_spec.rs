//! Column specifications for add and alter steps.
//!
//! A [`ColumnSpec`] records which attributes the caller asked to set. It is
//! resolved into a full [`ColumnSchema`] for an added column, or into a
//! [`ColumnSchemaDelta`] for an altered one. Both resolutions reject
//! combinations that make no sense for that kind of step.

use tabula_core::{ColumnSchema, ColumnSchemaDelta, CompressionType, DataType, Encoding, Value};

use crate::error::{AlterError, Result};

/// Requested attributes of a column. Unset attributes are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSpec {
    name: String,
    data_type: Option<DataType>,
    nullable: Option<bool>,
    primary_key: bool,
    encoding: Option<Encoding>,
    compression: Option<CompressionType>,
    block_size: Option<i32>,
    /// `Some(None)` requests a NULL default.
    #[allow(clippy::option_option)]
    default_value: Option<Option<Value>>,
    remove_default: bool,
    rename_to: Option<String>,
    comment: Option<String>,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = Some(true);
        self
    }

    pub fn not_null(&mut self) -> &mut Self {
        self.nullable = Some(false);
        self
    }

    pub fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn compression(&mut self, compression: CompressionType) -> &mut Self {
        self.compression = Some(compression);
        self
    }

    pub fn block_size(&mut self, block_size: i32) -> &mut Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default_value = Some(Some(value.into()));
        self
    }

    pub fn default_null(&mut self) -> &mut Self {
        self.default_value = Some(None);
        self
    }

    pub fn remove_default(&mut self) -> &mut Self {
        self.remove_default = true;
        self
    }

    pub fn rename_to(&mut self, new_name: impl Into<String>) -> &mut Self {
        self.rename_to = Some(new_name.into());
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether a type, nullability, or primary key change was requested.
    /// None of these can be changed on an existing column.
    #[must_use]
    pub fn requests_structural_change(&self) -> bool {
        self.data_type.is_some() || self.nullable.is_some() || self.primary_key
    }

    /// Whether any attribute that an existing column allows changing was set.
    #[must_use]
    pub fn has_alterable_change(&self) -> bool {
        self.rename_to.is_some() || self.has_alterable_change_besides_rename()
    }

    /// Whether the only requested change is a rename.
    #[must_use]
    pub fn is_rename_only(&self) -> bool {
        self.rename_to.is_some() && !self.has_alterable_change_besides_rename()
    }

    #[must_use]
    pub fn new_name(&self) -> Option<&str> {
        self.rename_to.as_deref()
    }

    fn has_alterable_change_besides_rename(&self) -> bool {
        self.default_value.is_some()
            || self.remove_default
            || self.encoding.is_some()
            || self.compression.is_some()
            || self.block_size.is_some()
            || self.comment.is_some()
    }

    /// Resolves the spec into the schema of a column being added.
    ///
    /// Nullability defaults to nullable, or non-nullable for key columns.
    ///
    /// # Errors
    ///
    /// `NotSupported` for a rename; `InvalidArgument` for a default removal,
    /// a missing type, a nullable key, a NULL default on a non-nullable
    /// column, or a default whose type differs from the column type.
    pub fn to_column_schema(&self) -> Result<ColumnSchema> {
        let name = self.name.as_str();
        if self.rename_to.is_some() {
            return Err(AlterError::not_supported(
                "cannot rename a column that is being added",
                name,
            ));
        }
        if self.remove_default {
            return Err(AlterError::invalid_column("no default value to remove", name));
        }
        let data_type = self
            .data_type
            .ok_or_else(|| AlterError::invalid_column("no type provided for column", name))?;

        let is_nullable = match (self.primary_key, self.nullable) {
            (true, Some(true)) => {
                return Err(AlterError::invalid_column(
                    "primary key column must not be nullable",
                    name,
                ));
            }
            (true, _) => false,
            (false, nullable) => nullable.unwrap_or(true),
        };

        let default = match &self.default_value {
            None => None,
            Some(None) if !is_nullable => {
                return Err(AlterError::invalid_column(
                    "NULL default value for a non-nullable column",
                    name,
                ));
            }
            Some(None) => None,
            Some(Some(value)) if value.data_type() != data_type => {
                return Err(AlterError::invalid_column(
                    format!(
                        "default value of type {} does not match column type {}",
                        value.data_type().name(),
                        data_type.name()
                    ),
                    name,
                ));
            }
            Some(Some(value)) => Some(value.clone()),
        };

        Ok(ColumnSchema {
            name: self.name.clone(),
            data_type,
            is_nullable,
            is_key: self.primary_key,
            id: None,
            read_default: default.clone(),
            write_default: default,
            encoding: self.encoding.unwrap_or_default(),
            compression: self.compression.unwrap_or_default(),
            block_size: self.block_size,
            comment: self.comment.clone(),
        })
    }

    /// Resolves the spec into a change to an existing column.
    ///
    /// A NULL default is expressed as removing the default.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a type, nullability, or key change was requested,
    /// or if a new default is set while the default is also being removed.
    pub fn to_column_schema_delta(&self) -> Result<ColumnSchemaDelta> {
        let name = self.name.as_str();
        if self.data_type.is_some() {
            return Err(AlterError::invalid_column(
                "type provided for column schema delta",
                name,
            ));
        }
        if self.nullable.is_some() {
            return Err(AlterError::invalid_column(
                "nullability provided for column schema delta",
                name,
            ));
        }
        if self.primary_key {
            return Err(AlterError::invalid_column(
                "primary key set for column schema delta",
                name,
            ));
        }

        let mut delta = ColumnSchemaDelta::new(name);
        delta.new_name = self.rename_to.clone();
        delta.remove_default = self.remove_default;
        match &self.default_value {
            Some(Some(_)) if self.remove_default => {
                return Err(AlterError::invalid_column(
                    "new default set but default also removed",
                    name,
                ));
            }
            Some(Some(value)) => delta.default_value = Some(value.clone()),
            Some(None) => delta.remove_default = true,
            None => {}
        }
        delta.encoding = self.encoding;
        delta.compression = self.compression;
        delta.block_size = self.block_size;
        delta.new_comment = self.comment.clone();
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_column_defaults_to_nullable() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::Int32);
        let col = spec.to_column_schema().expect("resolve");
        assert!(col.is_nullable);
        assert!(!col.is_key);
        assert_eq!(col.encoding, Encoding::AutoEncoding);
        assert_eq!(col.read_default, None);
    }

    #[test]
    fn add_column_with_default_sets_both_defaults() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::Int32).not_null().default_value(100);
        let col = spec.to_column_schema().expect("resolve");
        assert!(!col.is_nullable);
        assert_eq!(col.read_default, Some(Value::Int32(100)));
        assert_eq!(col.write_default, Some(Value::Int32(100)));
    }

    #[test]
    fn add_column_requires_type() {
        let err = ColumnSpec::new("c").to_column_schema().unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.column(), Some("c"));
    }

    #[test]
    fn add_column_rejects_rename() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::Int32).rename_to("d");
        assert!(spec.to_column_schema().unwrap_err().is_not_supported());
    }

    #[test]
    fn add_column_rejects_remove_default() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::Int32).remove_default();
        assert!(spec.to_column_schema().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn add_column_rejects_mismatched_default_type() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::Int32).default_value("text");
        let err = spec.to_column_schema().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: default value of type string does not match column type int32: c"
        );
    }

    #[test]
    fn add_column_rejects_null_default_on_not_null() {
        let mut spec = ColumnSpec::new("c");
        spec.data_type(DataType::String).not_null().default_null();
        assert!(spec.to_column_schema().unwrap_err().is_invalid_argument());

        let mut nullable = ColumnSpec::new("c");
        nullable.data_type(DataType::String).default_null();
        let col = nullable.to_column_schema().expect("nullable NULL default");
        assert_eq!(col.read_default, None);
    }

    #[test]
    fn primary_key_is_not_nullable() {
        let mut spec = ColumnSpec::new("k");
        spec.data_type(DataType::Int64).primary_key();
        let col = spec.to_column_schema().expect("resolve");
        assert!(col.is_key);
        assert!(!col.is_nullable);

        spec.nullable();
        assert!(spec.to_column_schema().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn delta_carries_requested_changes() {
        let mut spec = ColumnSpec::new("c");
        spec.rename_to("d")
            .comment("renamed")
            .encoding(Encoding::Rle)
            .compression(CompressionType::Lz4)
            .block_size(4096)
            .default_value(7i64);
        let delta = spec.to_column_schema_delta().expect("resolve");
        assert_eq!(delta.name, "c");
        assert_eq!(delta.new_name.as_deref(), Some("d"));
        assert_eq!(delta.new_comment.as_deref(), Some("renamed"));
        assert_eq!(delta.encoding, Some(Encoding::Rle));
        assert_eq!(delta.compression, Some(CompressionType::Lz4));
        assert_eq!(delta.block_size, Some(4096));
        assert_eq!(delta.default_value, Some(Value::Int64(7)));
        assert!(!delta.remove_default);
    }

    #[test]
    fn delta_rejects_default_with_remove_default() {
        let mut spec = ColumnSpec::new("c");
        spec.default_value(1).remove_default();
        let err = spec.to_column_schema_delta().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: new default set but default also removed: c"
        );
    }

    #[test]
    fn delta_null_default_removes_default() {
        let mut spec = ColumnSpec::new("c");
        spec.default_null();
        let delta = spec.to_column_schema_delta().expect("resolve");
        assert!(delta.remove_default);
        assert_eq!(delta.default_value, None);
    }

    #[test]
    fn delta_rejects_structural_changes() {
        let mut typed = ColumnSpec::new("c");
        typed.data_type(DataType::Int8);
        assert!(typed.to_column_schema_delta().is_err());

        let mut nullable = ColumnSpec::new("c");
        nullable.nullable();
        assert!(nullable.to_column_schema_delta().is_err());

        let mut key = ColumnSpec::new("c");
        key.primary_key();
        assert!(key.to_column_schema_delta().is_err());
    }

    #[test]
    fn rename_only_detection() {
        let mut spec = ColumnSpec::new("c");
        assert!(!spec.has_alterable_change());
        spec.rename_to("d");
        assert!(spec.is_rename_only());
        spec.comment("x");
        assert!(!spec.is_rename_only());
        assert!(spec.has_alterable_change());
    }
}
