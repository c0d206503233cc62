//! Wire-compatible message schemas for the master protocol.
//!
//! All types serialize as named `MsgPack` (`rmp_serde::to_vec_named()`) using
//! the protocol's snake_case field names. Byte-valued fields (cell defaults,
//! encoded rows) travel as `MsgPack` binaries via `serde_bytes`.

pub mod common;
pub mod master;
pub mod row_operations;

pub use common::{
    ColumnIdentifierPb, ColumnSchemaDeltaPb, ColumnSchemaPb, SchemaPb, TableIdentifierPb,
};

pub use master::{
    AddColumnPb, AddRangePartitionPb, AlterColumnPb, AlterTableRequest, AlterTableStepPb,
    CustomHashSchemaPb, DropColumnPb, DropRangePartitionPb, HashDimensionPb, MasterFeature,
    RenameColumnPb, StepType,
};

pub use row_operations::{RowOperationType, RowOperationsPb};
