//! Master service request schemas for table alteration.
//!
//! An [`AlterTableRequest`] carries table-level option changes plus an
//! ordered list of schema and partitioning steps. Each step serializes as a
//! map holding a `type` tag and the single payload matching that tag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::{
    ColumnIdentifierPb, ColumnSchemaDeltaPb, ColumnSchemaPb, SchemaPb, TableIdentifierPb,
};
use super::row_operations::RowOperationsPb;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of an alteration step as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    AddColumn,
    DropColumn,
    RenameColumn,
    AlterColumn,
    AddRangePartition,
    DropRangePartition,
}

/// Optional master capabilities a request depends on. The master rejects a
/// request listing a feature it does not support instead of misapplying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MasterFeature {
    AddDropRangePartitions,
    RangeSpecificHashSchema,
}

// ---------------------------------------------------------------------------
// Step payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnPb {
    pub schema: ColumnSchemaPb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnPb {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnPb {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnPb {
    pub delta: ColumnSchemaDeltaPb,
}

/// One hash dimension of a range-specific hash schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDimensionPb {
    pub columns: Vec<ColumnIdentifierPb>,
    pub num_buckets: i32,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomHashSchemaPb {
    pub hash_schema: Vec<HashDimensionPb>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddRangePartitionPb {
    /// Lower then upper bound, each tagged with its inclusivity.
    pub range_bounds: RowOperationsPb,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub custom_hash_schema: Option<CustomHashSchemaPb>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dimension_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropRangePartitionPb {
    pub range_bounds: RowOperationsPb,
}

/// A single tagged alteration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlterTableStepPb {
    AddColumn { add_column: AddColumnPb },
    DropColumn { drop_column: DropColumnPb },
    RenameColumn { rename_column: RenameColumnPb },
    AlterColumn { alter_column: AlterColumnPb },
    AddRangePartition { add_range_partition: AddRangePartitionPb },
    DropRangePartition { drop_range_partition: DropRangePartitionPb },
}

impl AlterTableStepPb {
    /// The wire tag of this step.
    #[must_use]
    pub const fn step_type(&self) -> StepType {
        match self {
            Self::AddColumn { .. } => StepType::AddColumn,
            Self::DropColumn { .. } => StepType::DropColumn,
            Self::RenameColumn { .. } => StepType::RenameColumn,
            Self::AlterColumn { .. } => StepType::AlterColumn,
            Self::AddRangePartition { .. } => StepType::AddRangePartition,
            Self::DropRangePartition { .. } => StepType::DropRangePartition,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Request to alter a table's schema, partitioning, or table-level options.
///
/// Optional fields are only present when the caller asked for that change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableRequest {
    pub table: TableIdentifierPb,
    #[serde(default)]
    pub alter_schema_steps: Vec<AlterTableStepPb>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_table_name: Option<String>,
    /// Schema used to decode the range bound rows in partitioning steps.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema: Option<SchemaPb>,
    pub modify_external_catalogs: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_extra_configs: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_table_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_table_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub num_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub disk_size_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row_count_limit: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required_feature_flags: Vec<MasterFeature>,
}

impl AlterTableRequest {
    /// Creates a request for `table_name` with no changes and
    /// `modify_external_catalogs` enabled.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table: TableIdentifierPb {
                table_name: Some(table_name.into()),
                table_id: None,
            },
            alter_schema_steps: Vec::new(),
            new_table_name: None,
            schema: None,
            modify_external_catalogs: true,
            new_extra_configs: None,
            new_table_owner: None,
            new_table_comment: None,
            num_replicas: None,
            disk_size_limit: None,
            row_count_limit: None,
            required_feature_flags: Vec::new(),
        }
    }

    /// Serializes to named `MsgPack`.
    ///
    /// # Errors
    ///
    /// Propagates any `rmp_serde` encoding failure.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    /// Deserializes from named `MsgPack`.
    ///
    /// # Errors
    ///
    /// Propagates any `rmp_serde` decoding failure.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }

    /// Wire tags of the steps, in order.
    #[must_use]
    pub fn step_types(&self) -> Vec<StepType> {
        self.alter_schema_steps
            .iter()
            .map(AlterTableStepPb::step_type)
            .collect()
    }
}
