//! Range partition bounds for add/drop range partition steps.

use tabula_core::PartialRow;

use crate::error::{AlterError, Result};

/// Whether a range bound includes the bound row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeBoundType {
    Inclusive,
    Exclusive,
}

/// One dimension of a hash schema applied to a single range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDimension {
    pub column_names: Vec<String>,
    pub num_buckets: i32,
    pub seed: u32,
}

/// A range partition described by its lower and upper bound rows.
///
/// Bounds default to an inclusive lower bound and an exclusive upper bound.
/// An unset column in a bound row leaves that part of the key unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePartition {
    lower: PartialRow,
    upper: PartialRow,
    lower_bound_type: RangeBoundType,
    upper_bound_type: RangeBoundType,
    hash_schema: Vec<HashDimension>,
}

impl RangePartition {
    /// Creates a range `[lower, upper)` with no range-specific hash schema.
    #[must_use]
    pub fn new(lower: PartialRow, upper: PartialRow) -> Self {
        Self {
            lower,
            upper,
            lower_bound_type: RangeBoundType::Inclusive,
            upper_bound_type: RangeBoundType::Exclusive,
            hash_schema: Vec::new(),
        }
    }

    /// Overrides the inclusivity of both bounds.
    #[must_use]
    pub fn with_bound_types(mut self, lower: RangeBoundType, upper: RangeBoundType) -> Self {
        self.lower_bound_type = lower;
        self.upper_bound_type = upper;
        self
    }

    /// Appends a hash dimension to this range's custom hash schema.
    /// Dimensions keep the order in which they were added.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `columns` is empty or fewer than two buckets are requested.
    pub fn add_hash_partitions<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        num_buckets: i32,
        seed: u32,
    ) -> Result<&mut Self> {
        if columns.is_empty() {
            return Err(AlterError::invalid_argument(
                "set of columns for hash partitioning must not be empty",
            ));
        }
        if num_buckets < 2 {
            return Err(AlterError::invalid_argument(
                "at least two buckets are required to establish hash partitioning",
            ));
        }
        self.hash_schema.push(HashDimension {
            column_names: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            num_buckets,
            seed,
        });
        Ok(self)
    }

    #[must_use]
    pub fn lower(&self) -> &PartialRow {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &PartialRow {
        &self.upper
    }

    #[must_use]
    pub fn lower_bound_type(&self) -> RangeBoundType {
        self.lower_bound_type
    }

    #[must_use]
    pub fn upper_bound_type(&self) -> RangeBoundType {
        self.upper_bound_type
    }

    #[must_use]
    pub fn hash_schema(&self) -> &[HashDimension] {
        &self.hash_schema
    }

    #[must_use]
    pub fn has_custom_hash_schema(&self) -> bool {
        !self.hash_schema.is_empty()
    }
}
