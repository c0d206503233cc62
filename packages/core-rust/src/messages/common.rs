//! Schema-level message types shared by master requests.
//!
//! Field names follow the master protocol's snake_case names. Optional
//! fields are skipped when `None`, so an absent field is distinguishable
//! from an explicit empty value on the wire.

use serde::{Deserialize, Serialize};

use crate::types::{CompressionType, DataType, Encoding};

/// Identifies a table by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableIdentifierPb {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub table_id: Option<String>,
}

/// Identifies a column by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIdentifierPb {
    pub name: String,
}

/// Wire form of a column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchemaPb {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<u32>,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub is_key: bool,
    pub is_nullable: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "serde_bytes"
    )]
    pub read_default_value: Option<Vec<u8>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "serde_bytes"
    )]
    pub write_default_value: Option<Vec<u8>>,
    pub encoding: Encoding,
    pub compression: CompressionType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cfile_block_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

/// Wire form of a table schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaPb {
    pub columns: Vec<ColumnSchemaPb>,
}

/// Wire form of a requested column change. Only populated fields are applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnSchemaDeltaPb {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "serde_bytes"
    )]
    pub default_value: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub remove_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub encoding: Option<Encoding>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compression: Option<CompressionType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub block_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of<T: Serialize>(val: &T) -> Vec<String> {
        let bytes = rmp_serde::to_vec_named(val).expect("serialize");
        let raw: rmpv::Value = rmpv::decode::read_value(&mut &bytes[..]).expect("decode");
        raw.as_map()
            .expect("map")
            .iter()
            .filter_map(|(k, _)| k.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn delta_omits_unset_fields() {
        let delta = ColumnSchemaDeltaPb {
            name: "c1".to_string(),
            new_comment: Some(String::new()),
            ..ColumnSchemaDeltaPb::default()
        };
        // An explicit empty comment is still present on the wire.
        assert_eq!(keys_of(&delta), vec!["name", "new_comment"]);
    }

    #[test]
    fn column_schema_type_field_is_named_type() {
        let col = ColumnSchemaPb {
            id: None,
            name: "c".to_string(),
            data_type: DataType::Int32,
            is_key: false,
            is_nullable: true,
            read_default_value: Some(vec![1, 0, 0, 0]),
            write_default_value: None,
            encoding: Encoding::AutoEncoding,
            compression: CompressionType::DefaultCompression,
            cfile_block_size: None,
            comment: None,
        };
        let keys = keys_of(&col);
        assert!(keys.contains(&"type".to_string()));
        assert!(keys.contains(&"read_default_value".to_string()));
        assert!(!keys.contains(&"write_default_value".to_string()));
        assert!(!keys.contains(&"id".to_string()));
    }

    #[test]
    fn default_bytes_travel_as_binary() {
        let delta = ColumnSchemaDeltaPb {
            name: "c".to_string(),
            default_value: Some(vec![0xAB, 0xCD]),
            ..ColumnSchemaDeltaPb::default()
        };
        let bytes = rmp_serde::to_vec_named(&delta).expect("serialize");
        let raw: rmpv::Value = rmpv::decode::read_value(&mut &bytes[..]).expect("decode");
        let default = raw
            .as_map()
            .expect("map")
            .iter()
            .find(|(k, _)| k.as_str() == Some("default_value"))
            .map(|(_, v)| v.clone())
            .expect("default_value present");
        assert_eq!(default.as_slice(), Some(&[0xAB, 0xCD][..]));

        let decoded: ColumnSchemaDeltaPb = rmp_serde::from_slice(&bytes).expect("deserialize");
        assert_eq!(decoded, delta);
    }
}
