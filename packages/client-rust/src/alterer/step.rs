use crate::column_spec::ColumnSpec;
use crate::range_partition::RangePartition;

/// One requested alteration. Each variant owns its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterStep {
    AddColumn(ColumnSpec),
    DropColumn(String),
    AlterColumn(ColumnSpec),
    AddRangePartition {
        partition: RangePartition,
        /// Placement label for the new range's tablets.
        dimension_label: Option<String>,
    },
    DropRangePartition(RangePartition),
}

impl AlterStep {
    /// The range partition this step adds or drops, if any.
    #[must_use]
    pub fn range_partition(&self) -> Option<&RangePartition> {
        match self {
            Self::AddRangePartition { partition, .. } | Self::DropRangePartition(partition) => {
                Some(partition)
            }
            Self::AddColumn(_) | Self::DropColumn(_) | Self::AlterColumn(_) => None,
        }
    }

    /// Whether this step adds a range with its own hash schema.
    #[must_use]
    pub fn adds_range_with_custom_hash_schema(&self) -> bool {
        matches!(self, Self::AddRangePartition { partition, .. } if partition.has_custom_hash_schema())
    }
}
