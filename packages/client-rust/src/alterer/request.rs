//! Assembly of an [`AlterTableRequest`] from accumulated steps.

use tabula_core::messages::{
    AddColumnPb, AddRangePartitionPb, AlterColumnPb, AlterTableRequest, AlterTableStepPb,
    ColumnIdentifierPb, CustomHashSchemaPb, DropColumnPb, DropRangePartitionPb, HashDimensionPb,
    MasterFeature, RenameColumnPb, RowOperationType, RowOperationsPb,
};
use tabula_core::wire::{column_delta_to_pb, column_schema_to_pb, schema_to_pb};
use tabula_core::{RowOperationsEncoder, SchemaEncodeFlags};
use tracing::debug;

use super::{same_schema, AlterStep, TableAlterer};
use crate::column_spec::ColumnSpec;
use crate::error::{AlterError, Result};
use crate::range_partition::{HashDimension, RangeBoundType, RangePartition};

impl TableAlterer {
    /// Validates the accumulated steps and options and builds the master request.
    ///
    /// Only options that were explicitly set appear in the request. Steps are
    /// emitted in the order they were added. Nothing is returned unless every
    /// step converts successfully.
    ///
    /// # Errors
    ///
    /// - the first deferred error recorded by a setter, unchanged
    /// - `InvalidArgument` when neither a step nor a table option was given
    /// - `NotSupported` for an alter-column step changing type, nullability,
    ///   or key membership
    /// - `InvalidArgument` for an alter-column step that changes nothing
    /// - any error from resolving a column spec
    pub fn to_request(&self) -> Result<AlterTableRequest> {
        if let Some(err) = &self.deferred_error {
            return Err(err.clone());
        }
        if !self.has_table_options() && self.steps.is_empty() {
            return Err(AlterError::invalid_argument("no alter steps provided"));
        }

        debug!(
            table = %self.table_name,
            steps = self.steps.len(),
            "building alter table request"
        );

        let mut req = AlterTableRequest::new(self.table_name.clone());
        req.modify_external_catalogs = self.config.modify_external_catalogs;
        req.new_table_name.clone_from(&self.rename_to);
        req.new_extra_configs.clone_from(&self.extra_configs);
        req.new_table_owner.clone_from(&self.set_owner_to);
        req.new_table_comment.clone_from(&self.set_comment_to);
        req.num_replicas = self.replication_factor;

        if let Some(schema) = &self.schema {
            let flags = SchemaEncodeFlags::default()
                .without_ids()
                .without_write_default()
                .without_comment();
            req.schema = Some(schema_to_pb(schema, flags));
        }

        req.disk_size_limit = self.disk_size_limit;
        req.row_count_limit = self.row_count_limit;

        for (idx, step) in self.steps.iter().enumerate() {
            let pb_step = self.step_to_pb(step)?;
            debug!(step = idx, step_type = ?pb_step.step_type(), "encoded alter step");
            req.alter_schema_steps.push(pb_step);
        }

        if self.has_alter_partitioning_steps() {
            req.required_feature_flags
                .push(MasterFeature::AddDropRangePartitions);
        }
        if self
            .steps
            .iter()
            .any(AlterStep::adds_range_with_custom_hash_schema)
        {
            req.required_feature_flags
                .push(MasterFeature::RangeSpecificHashSchema);
        }

        Ok(req)
    }

    fn step_to_pb(&self, step: &AlterStep) -> Result<AlterTableStepPb> {
        match step {
            AlterStep::AddColumn(spec) => {
                let col = spec.to_column_schema()?;
                let flags = SchemaEncodeFlags::default().without_write_default();
                Ok(AlterTableStepPb::AddColumn {
                    add_column: AddColumnPb {
                        schema: column_schema_to_pb(&col, flags),
                    },
                })
            }
            AlterStep::DropColumn(name) => Ok(AlterTableStepPb::DropColumn {
                drop_column: DropColumnPb { name: name.clone() },
            }),
            AlterStep::AlterColumn(spec) => alter_column_to_pb(spec),
            AlterStep::AddRangePartition {
                partition,
                dimension_label,
            } => {
                let hash_schema = partition.hash_schema();
                Ok(AlterTableStepPb::AddRangePartition {
                    add_range_partition: AddRangePartitionPb {
                        range_bounds: self.encode_bounds(partition)?,
                        custom_hash_schema: (!hash_schema.is_empty()).then(|| CustomHashSchemaPb {
                            hash_schema: hash_schema.iter().map(hash_dimension_to_pb).collect(),
                        }),
                        dimension_label: dimension_label.clone(),
                    },
                })
            }
            AlterStep::DropRangePartition(partition) => Ok(AlterTableStepPb::DropRangePartition {
                drop_range_partition: DropRangePartitionPb {
                    range_bounds: self.encode_bounds(partition)?,
                },
            }),
        }
    }

    fn encode_bounds(&self, partition: &RangePartition) -> Result<RowOperationsPb> {
        let schema = self.schema.as_ref().ok_or_else(|| {
            AlterError::invalid_argument("range partition steps require a table schema")
        })?;
        if !same_schema(partition.lower().schema(), schema)
            || !same_schema(partition.upper().schema(), schema)
        {
            return Err(AlterError::invalid_argument(
                "range partition bounds do not match the table schema",
            ));
        }

        let mut range_bounds = RowOperationsPb::default();
        let mut encoder = RowOperationsEncoder::new(&mut range_bounds);
        encoder.add(lower_bound_op(partition.lower_bound_type()), partition.lower());
        encoder.add(upper_bound_op(partition.upper_bound_type()), partition.upper());
        Ok(range_bounds)
    }
}

fn alter_column_to_pb(spec: &ColumnSpec) -> Result<AlterTableStepPb> {
    let name = spec.name();
    if spec.requests_structural_change() {
        debug!(column = name, "rejecting type, nullability, or key change");
        return Err(AlterError::not_supported("unsupported alter operation", name));
    }
    if !spec.has_alterable_change() {
        debug!(column = name, "rejecting alter column step with no changes");
        return Err(AlterError::invalid_column("no alter operation specified", name));
    }

    // A bare rename keeps the RENAME_COLUMN form.
    if let (true, Some(new_name)) = (spec.is_rename_only(), spec.new_name()) {
        debug!(column = name, new_name, "sending rename-only alter as RENAME_COLUMN");
        return Ok(AlterTableStepPb::RenameColumn {
            rename_column: RenameColumnPb {
                old_name: name.to_string(),
                new_name: new_name.to_string(),
            },
        });
    }

    let delta = spec.to_column_schema_delta()?;
    Ok(AlterTableStepPb::AlterColumn {
        alter_column: AlterColumnPb {
            delta: column_delta_to_pb(&delta),
        },
    })
}

/// Inclusive is the default for lower bounds, so it gets the plain tag.
fn lower_bound_op(bound: RangeBoundType) -> RowOperationType {
    match bound {
        RangeBoundType::Inclusive => RowOperationType::RangeLowerBound,
        RangeBoundType::Exclusive => RowOperationType::ExclusiveRangeLowerBound,
    }
}

/// Exclusive is the default for upper bounds, so it gets the plain tag.
fn upper_bound_op(bound: RangeBoundType) -> RowOperationType {
    match bound {
        RangeBoundType::Exclusive => RowOperationType::RangeUpperBound,
        RangeBoundType::Inclusive => RowOperationType::InclusiveRangeUpperBound,
    }
}

fn hash_dimension_to_pb(dim: &HashDimension) -> HashDimensionPb {
    HashDimensionPb {
        columns: dim
            .column_names
            .iter()
            .map(|name| ColumnIdentifierPb { name: name.clone() })
            .collect(),
        num_buckets: dim.num_buckets,
        seed: dim.seed,
    }
}
