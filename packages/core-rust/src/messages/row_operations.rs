//! Encoded row operation buffers carried inside requests.

use serde::{Deserialize, Serialize};

/// Tag preceding each encoded row in a [`RowOperationsPb`] buffer.
///
/// Discriminants are the wire byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RowOperationType {
    Insert = 1,
    Update = 2,
    Delete = 3,
    SplitRow = 4,
    Upsert = 5,
    /// Inclusive lower bound of a range partition.
    RangeLowerBound = 6,
    /// Exclusive upper bound of a range partition.
    RangeUpperBound = 7,
    ExclusiveRangeLowerBound = 8,
    InclusiveRangeUpperBound = 9,
}

impl RowOperationType {
    /// Wire byte for this tag.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte, returning `None` for unassigned values.
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Insert),
            2 => Some(Self::Update),
            3 => Some(Self::Delete),
            4 => Some(Self::SplitRow),
            5 => Some(Self::Upsert),
            6 => Some(Self::RangeLowerBound),
            7 => Some(Self::RangeUpperBound),
            8 => Some(Self::ExclusiveRangeLowerBound),
            9 => Some(Self::InclusiveRangeUpperBound),
            _ => None,
        }
    }
}

/// A buffer of encoded row operations.
///
/// `rows` holds one tagged row after another; variable-length cells point
/// into `indirect_data` by (offset, length).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowOperationsPb {
    #[serde(with = "serde_bytes", default)]
    pub rows: Vec<u8>,
    #[serde(with = "serde_bytes", default)]
    pub indirect_data: Vec<u8>,
}
