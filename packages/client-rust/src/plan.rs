//! JSON alteration plans.
//!
//! An [`AlterPlan`] is a declarative description of one table alteration.
//! [`AlterPlan::to_alterer`] replays it through a [`TableAlterer`] in
//! document order, so the resulting request is exactly what the same calls
//! made by hand would produce.
//!
//! ```json
//! {
//!   "table": "metrics",
//!   "options": { "owner": "ops", "replication_factor": 3 },
//!   "schema": [
//!     { "name": "host", "type": "STRING", "key": true },
//!     { "name": "ts", "type": "UNIXTIME_MICROS", "key": true },
//!     { "name": "value", "type": "DOUBLE" }
//!   ],
//!   "steps": [
//!     { "op": "add_column", "name": "region", "type": "STRING", "default": "us" },
//!     { "op": "alter_column", "name": "value", "rename_to": "reading" },
//!     { "op": "add_range_partition",
//!       "lower": { "host": "a" }, "upper": { "host": "m" },
//!       "hash_partitions": [ { "columns": ["ts"], "num_buckets": 4 } ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabula_core::{
    ColumnSchema, CompressionType, DataType, Encoding, PartialRow, RowError, Schema, SchemaError,
    Value,
};

use crate::alterer::TableAlterer;
use crate::column_spec::ColumnSpec;
use crate::config::AlterConfig;
use crate::error::AlterError;
use crate::range_partition::{RangeBoundType, RangePartition};

/// Errors raised while turning a plan document into an alterer.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("malformed plan: {0}")]
    Json(#[from] serde_json::Error),
    #[error("range partition steps require a \"schema\" section")]
    MissingSchema,
    #[error("column {column} has no known type; set \"type\" or list it in \"schema\"")]
    UnknownColumnType { column: String },
    #[error("value {value} is not a valid {data_type} for column {column}")]
    BadValue {
        column: String,
        data_type: &'static str,
        value: serde_json::Value,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Row(#[from] RowError),
    #[error(transparent)]
    Alter(#[from] AlterError),
}

/// A complete alteration plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterPlan {
    pub table: String,
    #[serde(default)]
    pub options: PlanOptions,
    /// Table schema used to build range bound rows and to type alter defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<PlanColumn>>,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

/// Table-level options. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_configs: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_external_catalogs: Option<bool>,
}

/// One column of the plan's table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub nullable: bool,
}

/// Column attributes shared by add and alter steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanColumnChange {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_size: Option<i32>,
    /// JSON `null` requests a NULL default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub remove_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanBound {
    Inclusive,
    Exclusive,
}

impl From<PlanBound> for RangeBoundType {
    fn from(bound: PlanBound) -> Self {
        match bound {
            PlanBound::Inclusive => Self::Inclusive,
            PlanBound::Exclusive => Self::Exclusive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanHashDimension {
    pub columns: Vec<String>,
    pub num_buckets: i32,
    #[serde(default)]
    pub seed: u32,
}

/// A range described by bound values keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanRange {
    #[serde(default)]
    pub lower: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub upper: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<PlanBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<PlanBound>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hash_partitions: Vec<PlanHashDimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_label: Option<String>,
}

/// One step of the plan, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    AddColumn(PlanColumnChange),
    AlterColumn(PlanColumnChange),
    DropColumn { name: String },
    AddRangePartition(PlanRange),
    DropRangePartition(PlanRange),
}

impl AlterPlan {
    /// Parses a plan from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Json`] if the text is not a valid plan.
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Replays the plan through a new [`TableAlterer`] built with `config`.
    ///
    /// Problems the alterer itself checks (unsupported alterations, empty
    /// plans) surface later from `to_request`, not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema section is invalid, a range step has
    /// no schema to build rows from, or a value does not fit its column.
    pub fn to_alterer(&self, config: AlterConfig) -> Result<TableAlterer, PlanError> {
        let schema = self
            .schema
            .as_deref()
            .map(build_schema)
            .transpose()?
            .map(Arc::new);

        let mut alterer = TableAlterer::with_config(self.table.clone(), config);
        self.apply_options(&mut alterer);

        for step in &self.steps {
            match step {
                PlanStep::AddColumn(change) => {
                    let data_type = change.data_type;
                    apply_column_change(
                        alterer.add_column(change.name.clone()),
                        change,
                        data_type,
                    )?;
                }
                PlanStep::AlterColumn(change) => {
                    let data_type = change
                        .data_type
                        .or_else(|| column_type(schema.as_deref(), &change.name));
                    apply_column_change(
                        alterer.alter_column(change.name.clone()),
                        change,
                        data_type,
                    )?;
                }
                PlanStep::DropColumn { name } => {
                    alterer.drop_column(name.clone());
                }
                PlanStep::AddRangePartition(range) => {
                    let partition = build_partition(schema.as_ref(), range)?;
                    match &range.dimension_label {
                        Some(label) => {
                            alterer.add_range_partition_with_dimension(partition, label.clone())
                        }
                        None => alterer.add_range_partition(partition),
                    };
                }
                PlanStep::DropRangePartition(range) => {
                    alterer.drop_range_partition(build_partition(schema.as_ref(), range)?);
                }
            }
        }
        Ok(alterer)
    }

    fn apply_options(&self, alterer: &mut TableAlterer) {
        let options = &self.options;
        if let Some(name) = &options.rename_to {
            alterer.rename_to(name.clone());
        }
        if let Some(owner) = &options.owner {
            alterer.set_owner(owner.clone());
        }
        if let Some(comment) = &options.comment {
            alterer.set_comment(comment.clone());
        }
        if let Some(n) = options.replication_factor {
            alterer.set_replication_factor(n);
        }
        if let Some(configs) = &options.extra_configs {
            alterer.alter_extra_configs(configs.clone());
        }
        if let Some(bytes) = options.disk_size_limit {
            alterer.set_table_disk_size_limit(bytes);
        }
        if let Some(rows) = options.row_count_limit {
            alterer.set_table_row_count_limit(rows);
        }
        if let Some(modify) = options.modify_external_catalogs {
            alterer.modify_external_catalogs(modify);
        }
    }
}

fn build_schema(columns: &[PlanColumn]) -> Result<Schema, SchemaError> {
    let columns = columns
        .iter()
        .map(|c| {
            let mut col = ColumnSchema::new(c.name.clone(), c.data_type);
            col.is_key = c.key;
            col.is_nullable = c.nullable && !c.key;
            col
        })
        .collect();
    Schema::new(columns)
}

fn column_type(schema: Option<&Schema>, name: &str) -> Option<DataType> {
    let schema = schema?;
    let idx = schema.find_column(name)?;
    schema.column(idx).map(|col| col.data_type)
}

fn apply_column_change(
    spec: &mut ColumnSpec,
    change: &PlanColumnChange,
    data_type: Option<DataType>,
) -> Result<(), PlanError> {
    if let Some(t) = change.data_type {
        spec.data_type(t);
    }
    match change.nullable {
        Some(true) => {
            spec.nullable();
        }
        Some(false) => {
            spec.not_null();
        }
        None => {}
    }
    if change.primary_key {
        spec.primary_key();
    }
    if let Some(encoding) = change.encoding {
        spec.encoding(encoding);
    }
    if let Some(compression) = change.compression {
        spec.compression(compression);
    }
    if let Some(size) = change.block_size {
        spec.block_size(size);
    }
    match &change.default {
        Some(serde_json::Value::Null) => {
            spec.default_null();
        }
        Some(json) => {
            let data_type = data_type.ok_or_else(|| PlanError::UnknownColumnType {
                column: change.name.clone(),
            })?;
            spec.default_value(json_to_value(&change.name, data_type, json)?);
        }
        None => {}
    }
    if change.remove_default {
        spec.remove_default();
    }
    if let Some(new_name) = &change.rename_to {
        spec.rename_to(new_name.clone());
    }
    if let Some(comment) = &change.comment {
        spec.comment(comment.clone());
    }
    Ok(())
}

fn build_partition(
    schema: Option<&Arc<Schema>>,
    range: &PlanRange,
) -> Result<RangePartition, PlanError> {
    let schema = schema.ok_or(PlanError::MissingSchema)?;
    let lower = build_row(schema, &range.lower)?;
    let upper = build_row(schema, &range.upper)?;

    let mut partition = RangePartition::new(lower, upper);
    if range.lower_bound.is_some() || range.upper_bound.is_some() {
        let lower_bound = range.lower_bound.map_or(RangeBoundType::Inclusive, Into::into);
        let upper_bound = range.upper_bound.map_or(RangeBoundType::Exclusive, Into::into);
        partition = partition.with_bound_types(lower_bound, upper_bound);
    }
    for dim in &range.hash_partitions {
        partition.add_hash_partitions(&dim.columns, dim.num_buckets, dim.seed)?;
    }
    Ok(partition)
}

fn build_row(
    schema: &Arc<Schema>,
    values: &BTreeMap<String, serde_json::Value>,
) -> Result<PartialRow, PlanError> {
    let mut row = schema.new_partial_row();
    for (name, json) in values {
        if json.is_null() {
            row.set_null(name)?;
            continue;
        }
        let data_type = schema.column_by_name(name)?.data_type;
        row.set(name, json_to_value(name, data_type, json)?)?;
    }
    Ok(row)
}

/// Converts a JSON scalar into a cell value of `data_type`.
///
/// Binary values are written as hex strings.
#[allow(clippy::cast_possible_truncation)]
fn json_to_value(
    column: &str,
    data_type: DataType,
    json: &serde_json::Value,
) -> Result<Value, PlanError> {
    let int = || json.as_i64();
    let value = match data_type {
        DataType::Int8 => int().and_then(|v| i8::try_from(v).ok()).map(Value::Int8),
        DataType::Int16 => int().and_then(|v| i16::try_from(v).ok()).map(Value::Int16),
        DataType::Int32 => int().and_then(|v| i32::try_from(v).ok()).map(Value::Int32),
        DataType::Int64 => int().map(Value::Int64),
        DataType::UnixtimeMicros => int().map(Value::UnixtimeMicros),
        DataType::Float => json.as_f64().map(|v| Value::Float(v as f32)),
        DataType::Double => json.as_f64().map(Value::Double),
        DataType::Bool => json.as_bool().map(Value::Bool),
        DataType::String => json.as_str().map(|s| Value::String(s.to_string())),
        DataType::Binary => json
            .as_str()
            .and_then(|s| hex::decode(s).ok())
            .map(Value::Binary),
    };
    value.ok_or_else(|| PlanError::BadValue {
        column: column.to_string(),
        data_type: data_type.name(),
        value: json.clone(),
    })
}

#[cfg(test)]
mod tests {
    use tabula_core::messages::{AlterTableStepPb, MasterFeature, StepType};
    use tabula_core::RowOperationsDecoder;

    use super::*;

    const SAMPLE: &str = r#"{
        "table": "metrics",
        "options": { "owner": "ops", "replication_factor": 3 },
        "schema": [
            { "name": "host", "type": "STRING", "key": true },
            { "name": "ts", "type": "UNIXTIME_MICROS", "key": true },
            { "name": "value", "type": "DOUBLE", "nullable": true }
        ],
        "steps": [
            { "op": "add_column", "name": "region", "type": "STRING", "default": "us" },
            { "op": "alter_column", "name": "value", "rename_to": "reading" },
            { "op": "alter_column", "name": "value", "default": 1.5 },
            { "op": "drop_column", "name": "legacy" },
            { "op": "add_range_partition",
              "lower": { "host": "a" }, "upper": { "host": "m" },
              "upper_bound": "inclusive",
              "hash_partitions": [ { "columns": ["ts"], "num_buckets": 4 } ],
              "dimension_label": "hdd" }
        ]
    }"#;

    #[test]
    fn sample_plan_builds_request() {
        let plan = AlterPlan::from_json(SAMPLE).expect("parse");
        let req = plan
            .to_alterer(AlterConfig::default())
            .expect("alterer")
            .to_request()
            .expect("request");

        assert_eq!(req.new_table_owner.as_deref(), Some("ops"));
        assert_eq!(req.num_replicas, Some(3));
        assert_eq!(
            req.step_types(),
            vec![
                StepType::AddColumn,
                StepType::RenameColumn,
                StepType::AlterColumn,
                StepType::DropColumn,
                StepType::AddRangePartition,
            ]
        );
        assert_eq!(
            req.required_feature_flags,
            vec![
                MasterFeature::AddDropRangePartitions,
                MasterFeature::RangeSpecificHashSchema
            ]
        );
        assert_eq!(req.schema.as_ref().map(|s| s.columns.len()), Some(3));
    }

    #[test]
    fn alter_default_uses_schema_type() {
        let plan = AlterPlan::from_json(SAMPLE).expect("parse");
        let req = plan
            .to_alterer(AlterConfig::default())
            .expect("alterer")
            .to_request()
            .expect("request");
        let AlterTableStepPb::AlterColumn { alter_column } = &req.alter_schema_steps[2] else {
            panic!("expected ALTER_COLUMN");
        };
        assert_eq!(
            alter_column.delta.default_value,
            Some(1.5f64.to_le_bytes().to_vec())
        );
    }

    #[test]
    fn range_bounds_carry_plan_values() {
        let plan = AlterPlan::from_json(SAMPLE).expect("parse");
        let columns = plan.schema.as_deref().expect("schema section");
        let schema = Arc::new(build_schema(columns).expect("valid schema"));
        let req = plan
            .to_alterer(AlterConfig::default())
            .expect("alterer")
            .to_request()
            .expect("request");
        let AlterTableStepPb::AddRangePartition { add_range_partition } =
            &req.alter_schema_steps[4]
        else {
            panic!("expected ADD_RANGE_PARTITION");
        };
        let ops = RowOperationsDecoder::new(&add_range_partition.range_bounds, schema)
            .decode_all()
            .expect("decode");
        assert_eq!(ops[0].1.get_by_name("host"), Some(&Value::String("a".into())));
        assert_eq!(ops[1].1.get_by_name("host"), Some(&Value::String("m".into())));
        assert_eq!(add_range_partition.dimension_label.as_deref(), Some("hdd"));
    }

    #[test]
    fn range_step_without_schema_is_rejected() {
        let plan = AlterPlan::from_json(
            r#"{ "table": "t", "steps": [ { "op": "drop_range_partition" } ] }"#,
        )
        .expect("parse");
        assert!(matches!(
            plan.to_alterer(AlterConfig::default()),
            Err(PlanError::MissingSchema)
        ));
    }

    #[test]
    fn alter_default_without_known_type_is_rejected() {
        let plan = AlterPlan::from_json(
            r#"{ "table": "t", "steps": [ { "op": "alter_column", "name": "c", "default": 1 } ] }"#,
        )
        .expect("parse");
        assert!(matches!(
            plan.to_alterer(AlterConfig::default()),
            Err(PlanError::UnknownColumnType { column }) if column == "c"
        ));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = json_to_value("c", DataType::Int8, &serde_json::json!(300)).unwrap_err();
        assert_eq!(err.to_string(), "value 300 is not a valid int8 for column c");
    }

    #[test]
    fn binary_values_are_hex() {
        let value = json_to_value("b", DataType::Binary, &serde_json::json!("00ff")).expect("hex");
        assert_eq!(value, Value::Binary(vec![0x00, 0xff]));
    }

    #[test]
    fn empty_plan_fails_at_finalize() {
        let plan = AlterPlan::from_json(r#"{ "table": "t" }"#).expect("parse");
        let alterer = plan.to_alterer(AlterConfig::default()).expect("alterer");
        assert!(alterer.to_request().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        let err = AlterPlan::from_json(r#"{ "table": "t", "steps": [ { "op": "truncate" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, PlanError::Json(_)));
    }
}
