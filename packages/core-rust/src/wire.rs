//! Conversion of schema model types into their wire messages.

use crate::messages::common::{ColumnSchemaDeltaPb, ColumnSchemaPb, SchemaPb};
use crate::schema::{ColumnSchema, ColumnSchemaDelta, Schema};
use crate::types::Value;

/// Fields to leave out when converting a schema to its wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaEncodeFlags {
    pub without_ids: bool,
    pub without_write_default: bool,
    pub without_comment: bool,
}

impl SchemaEncodeFlags {
    /// Encode every field.
    pub const ALL: Self = Self {
        without_ids: false,
        without_write_default: false,
        without_comment: false,
    };

    #[must_use]
    pub const fn without_ids(mut self) -> Self {
        self.without_ids = true;
        self
    }

    #[must_use]
    pub const fn without_write_default(mut self) -> Self {
        self.without_write_default = true;
        self
    }

    #[must_use]
    pub const fn without_comment(mut self) -> Self {
        self.without_comment = true;
        self
    }
}

#[must_use]
pub fn column_schema_to_pb(col: &ColumnSchema, flags: SchemaEncodeFlags) -> ColumnSchemaPb {
    ColumnSchemaPb {
        id: if flags.without_ids { None } else { col.id },
        name: col.name.clone(),
        data_type: col.data_type,
        is_key: col.is_key,
        is_nullable: col.is_nullable,
        read_default_value: col.read_default.as_ref().map(Value::encode_cell),
        write_default_value: if flags.without_write_default {
            None
        } else {
            col.write_default.as_ref().map(Value::encode_cell)
        },
        encoding: col.encoding,
        compression: col.compression,
        cfile_block_size: col.block_size,
        comment: if flags.without_comment {
            None
        } else {
            col.comment.clone()
        },
    }
}

#[must_use]
pub fn schema_to_pb(schema: &Schema, flags: SchemaEncodeFlags) -> SchemaPb {
    SchemaPb {
        columns: schema
            .columns()
            .iter()
            .map(|col| column_schema_to_pb(col, flags))
            .collect(),
    }
}

#[must_use]
pub fn column_delta_to_pb(delta: &ColumnSchemaDelta) -> ColumnSchemaDeltaPb {
    ColumnSchemaDeltaPb {
        name: delta.name.clone(),
        new_name: delta.new_name.clone(),
        default_value: delta.default_value.as_ref().map(Value::encode_cell),
        remove_default: delta.remove_default.then_some(true),
        encoding: delta.encoding,
        compression: delta.compression,
        block_size: delta.block_size,
        new_comment: delta.new_comment.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn annotated_schema() -> Schema {
        let mut value = ColumnSchema::new("v", DataType::Int32);
        value.read_default = Some(Value::Int32(1));
        value.write_default = Some(Value::Int32(2));
        value.comment = Some("a value".to_string());
        Schema::new(vec![ColumnSchema::key("k", DataType::Int64), value])
            .expect("valid schema")
            .with_column_ids(10)
            .expect("ids fit")
    }

    #[test]
    fn all_fields_encoded_by_default() {
        let pb = schema_to_pb(&annotated_schema(), SchemaEncodeFlags::ALL);
        let v = &pb.columns[1];
        assert_eq!(v.id, Some(11));
        assert_eq!(v.read_default_value, Some(vec![1, 0, 0, 0]));
        assert_eq!(v.write_default_value, Some(vec![2, 0, 0, 0]));
        assert_eq!(v.comment.as_deref(), Some("a value"));
    }

    #[test]
    fn flags_suppress_fields() {
        let flags = SchemaEncodeFlags::default()
            .without_ids()
            .without_write_default()
            .without_comment();
        let pb = schema_to_pb(&annotated_schema(), flags);
        let v = &pb.columns[1];
        assert_eq!(v.id, None);
        assert_eq!(v.write_default_value, None);
        assert_eq!(v.comment, None);
        // The read default is never suppressed.
        assert_eq!(v.read_default_value, Some(vec![1, 0, 0, 0]));
        assert!(pb.columns[0].is_key);
    }

    #[test]
    fn delta_encodes_only_requested_changes() {
        let mut delta = ColumnSchemaDelta::new("c");
        delta.remove_default = true;
        let pb = column_delta_to_pb(&delta);
        assert_eq!(pb.name, "c");
        assert_eq!(pb.remove_default, Some(true));
        assert_eq!(pb.default_value, None);
        assert_eq!(pb.new_name, None);

        let untouched = column_delta_to_pb(&ColumnSchemaDelta::new("c"));
        assert_eq!(untouched.remove_default, None);
    }
}
