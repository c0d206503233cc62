//! Accumulation of table alteration steps and options.
//!
//! [`TableAlterer`] records what the caller asks for, in call order, without
//! judging it. Validation happens once, when [`TableAlterer::to_request`]
//! assembles the master request. Setters that cannot represent their input
//! on the wire record a deferred error instead of failing; the first such
//! error is returned by `to_request`.

mod request;
mod step;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tabula_core::Schema;
use tracing::warn;

use crate::column_spec::ColumnSpec;
use crate::config::AlterConfig;
use crate::error::AlterError;
use crate::range_partition::RangePartition;

pub use step::AlterStep;

/// Builder for a single alteration of one table.
///
/// Scalar options are last-write-wins; steps accumulate in call order.
#[derive(Debug, Clone)]
pub struct TableAlterer {
    table_name: String,
    config: AlterConfig,
    deferred_error: Option<AlterError>,

    rename_to: Option<String>,
    set_owner_to: Option<String>,
    set_comment_to: Option<String>,
    replication_factor: Option<i32>,
    extra_configs: Option<BTreeMap<String, String>>,
    disk_size_limit: Option<i64>,
    row_count_limit: Option<i64>,

    /// Schema of the range bound rows, captured from the first partition step.
    schema: Option<Arc<Schema>>,
    steps: Vec<AlterStep>,
}

impl TableAlterer {
    /// Creates an alterer for `table_name` with the default [`AlterConfig`].
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self::with_config(table_name, AlterConfig::default())
    }

    #[must_use]
    pub fn with_config(table_name: impl Into<String>, config: AlterConfig) -> Self {
        Self {
            table_name: table_name.into(),
            config,
            deferred_error: None,
            rename_to: None,
            set_owner_to: None,
            set_comment_to: None,
            replication_factor: None,
            extra_configs: None,
            disk_size_limit: None,
            row_count_limit: None,
            schema: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn config(&self) -> &AlterConfig {
        &self.config
    }

    #[must_use]
    pub fn steps(&self) -> &[AlterStep] {
        &self.steps
    }

    /// The first error recorded by a setter, if any.
    #[must_use]
    pub fn deferred_error(&self) -> Option<&AlterError> {
        self.deferred_error.as_ref()
    }

    /// Whether any step adds or drops a range partition.
    #[must_use]
    pub fn has_alter_partitioning_steps(&self) -> bool {
        self.steps.iter().any(|s| s.range_partition().is_some())
    }

    // ---- table options ----

    pub fn rename_to(&mut self, new_name: impl Into<String>) -> &mut Self {
        self.rename_to = Some(new_name.into());
        self
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) -> &mut Self {
        self.set_owner_to = Some(owner.into());
        self
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.set_comment_to = Some(comment.into());
        self
    }

    pub fn set_replication_factor(&mut self, num_replicas: u32) -> &mut Self {
        match i32::try_from(num_replicas) {
            Ok(n) => self.replication_factor = Some(n),
            Err(_) => self.defer(AlterError::invalid_argument(format!(
                "replication factor {num_replicas} exceeds {}",
                i32::MAX
            ))),
        }
        self
    }

    /// Replaces the set of extra configuration changes.
    pub fn alter_extra_configs<K, V>(
        &mut self,
        configs: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.extra_configs = Some(
            configs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn set_table_disk_size_limit(&mut self, bytes: u64) -> &mut Self {
        match i64::try_from(bytes) {
            Ok(limit) => self.disk_size_limit = Some(limit),
            Err(_) => self.defer(AlterError::invalid_argument(format!(
                "table disk size limit {bytes} exceeds {}",
                i64::MAX
            ))),
        }
        self
    }

    pub fn set_table_row_count_limit(&mut self, rows: u64) -> &mut Self {
        match i64::try_from(rows) {
            Ok(limit) => self.row_count_limit = Some(limit),
            Err(_) => self.defer(AlterError::invalid_argument(format!(
                "table row count limit {rows} exceeds {}",
                i64::MAX
            ))),
        }
        self
    }

    pub fn modify_external_catalogs(&mut self, modify: bool) -> &mut Self {
        self.config.modify_external_catalogs = modify;
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.timeout = timeout;
        self
    }

    pub fn wait(&mut self, wait: bool) -> &mut Self {
        self.config.wait = wait;
        self
    }

    // ---- steps ----

    /// Appends a step.
    pub fn add_step(&mut self, step: AlterStep) -> &mut Self {
        if let Some(partition) = step.range_partition() {
            self.track_bound_schema(partition);
        }
        self.steps.push(step);
        self
    }

    /// Appends an add-column step and returns its spec for configuration.
    pub fn add_column(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.steps.push(AlterStep::AddColumn(ColumnSpec::new(name)));
        match self.steps.last_mut() {
            Some(AlterStep::AddColumn(spec)) => spec,
            _ => unreachable!("add-column step was just pushed"),
        }
    }

    /// Appends an alter-column step and returns its spec for configuration.
    pub fn alter_column(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.steps.push(AlterStep::AlterColumn(ColumnSpec::new(name)));
        match self.steps.last_mut() {
            Some(AlterStep::AlterColumn(spec)) => spec,
            _ => unreachable!("alter-column step was just pushed"),
        }
    }

    pub fn drop_column(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_step(AlterStep::DropColumn(name.into()))
    }

    pub fn add_range_partition(&mut self, partition: RangePartition) -> &mut Self {
        self.add_step(AlterStep::AddRangePartition {
            partition,
            dimension_label: None,
        })
    }

    /// Adds a range whose tablets are placed according to `dimension_label`.
    pub fn add_range_partition_with_dimension(
        &mut self,
        partition: RangePartition,
        dimension_label: impl Into<String>,
    ) -> &mut Self {
        self.add_step(AlterStep::AddRangePartition {
            partition,
            dimension_label: Some(dimension_label.into()),
        })
    }

    pub fn drop_range_partition(&mut self, partition: RangePartition) -> &mut Self {
        self.add_step(AlterStep::DropRangePartition(partition))
    }

    // ---- internals ----

    fn has_table_options(&self) -> bool {
        self.rename_to.is_some()
            || self.extra_configs.is_some()
            || self.set_owner_to.is_some()
            || self.set_comment_to.is_some()
            || self.disk_size_limit.is_some()
            || self.row_count_limit.is_some()
            || self.replication_factor.is_some()
    }

    fn track_bound_schema(&mut self, partition: &RangePartition) {
        let lower = partition.lower().schema();
        if !same_schema(lower, partition.upper().schema()) {
            self.defer(AlterError::invalid_argument(
                "range partition bounds must have matching schemas",
            ));
            return;
        }
        match self.schema.as_ref().map(|existing| same_schema(existing, lower)) {
            None => self.schema = Some(Arc::clone(lower)),
            Some(false) => self.defer(AlterError::invalid_argument(
                "range partition bounds must share the schema of earlier bounds",
            )),
            Some(true) => {}
        }
    }

    fn defer(&mut self, err: AlterError) {
        warn!(table = %self.table_name, error = %err, "recording deferred alter error");
        if self.deferred_error.is_none() {
            self.deferred_error = Some(err);
        }
    }
}

pub(crate) fn same_schema(a: &Arc<Schema>, b: &Arc<Schema>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}
