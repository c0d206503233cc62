//! Tabula Client: builds table alteration requests for the master.
//!
//! A [`TableAlterer`] accumulates renames, option changes, column steps, and
//! range partition steps. [`TableAlterer::to_request`] validates them and
//! produces the [`AlterTableRequest`](tabula_core::messages::AlterTableRequest)
//! wire message.

pub mod alterer;
pub mod column_spec;
pub mod config;
pub mod error;
pub mod plan;
pub mod range_partition;

pub use alterer::{AlterStep, TableAlterer};
pub use column_spec::ColumnSpec;
pub use config::AlterConfig;
pub use error::{AlterError, Result};
pub use plan::{AlterPlan, PlanError};
pub use range_partition::{HashDimension, RangeBoundType, RangePartition};
