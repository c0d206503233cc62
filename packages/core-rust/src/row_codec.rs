//! Encoding of tagged partial rows into a [`RowOperationsPb`] buffer.
//!
//! # Row layout
//!
//! Each operation is appended to `rows` as:
//!
//! 1. one byte holding the [`RowOperationType`] tag
//! 2. an isset bitmap, one bit per schema column (LSB first)
//! 3. a null bitmap of the same size, present only if the schema has
//!    nullable columns
//! 4. for every column that is set and not NULL, in schema order: the
//!    little-endian fixed-width cell, or for strings and binaries a
//!    `(offset: u64, len: u64)` pair pointing into `indirect_data`

use std::sync::Arc;

use crate::error::RowError;
use crate::messages::row_operations::{RowOperationType, RowOperationsPb};
use crate::row::PartialRow;
use crate::schema::Schema;
use crate::types::Value;

fn bitmap_len(num_columns: usize) -> usize {
    num_columns.div_ceil(8)
}

fn bit_set(bitmap: &[u8], idx: usize) -> bool {
    bitmap[idx / 8] & (1 << (idx % 8)) != 0
}

/// Appends tagged rows to a [`RowOperationsPb`]. Append-only: rows already
/// in the buffer are never rewritten.
pub struct RowOperationsEncoder<'a> {
    pb: &'a mut RowOperationsPb,
}

impl<'a> RowOperationsEncoder<'a> {
    #[must_use]
    pub fn new(pb: &'a mut RowOperationsPb) -> Self {
        Self { pb }
    }

    /// Appends `row` tagged with `op`.
    pub fn add(&mut self, op: RowOperationType, row: &PartialRow) {
        let schema = row.schema();
        let num_columns = schema.num_columns();

        self.pb.rows.push(op.as_byte());

        let mut isset = vec![0u8; bitmap_len(num_columns)];
        let mut nulls = vec![0u8; bitmap_len(num_columns)];
        for idx in 0..num_columns {
            if row.is_set(idx) {
                isset[idx / 8] |= 1 << (idx % 8);
            }
            if row.is_null(idx) {
                nulls[idx / 8] |= 1 << (idx % 8);
            }
        }
        self.pb.rows.extend_from_slice(&isset);
        if schema.has_nullables() {
            self.pb.rows.extend_from_slice(&nulls);
        }

        for idx in 0..num_columns {
            let Some(value) = row.get(idx) else { continue };
            let cell = value.encode_cell();
            if value.data_type().is_var_len() {
                let offset = self.pb.indirect_data.len() as u64;
                self.pb.indirect_data.extend_from_slice(&cell);
                self.pb.rows.extend_from_slice(&offset.to_le_bytes());
                self.pb.rows.extend_from_slice(&(cell.len() as u64).to_le_bytes());
            } else {
                self.pb.rows.extend_from_slice(&cell);
            }
        }
    }
}

/// Decodes a [`RowOperationsPb`] produced by [`RowOperationsEncoder`] back
/// into tagged rows, given the schema the rows were encoded with.
pub struct RowOperationsDecoder<'a> {
    pb: &'a RowOperationsPb,
    schema: Arc<Schema>,
    pos: usize,
}

impl<'a> RowOperationsDecoder<'a> {
    #[must_use]
    pub fn new(pb: &'a RowOperationsPb, schema: Arc<Schema>) -> Self {
        Self { pb, schema, pos: 0 }
    }

    /// Decodes every operation in the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::Malformed`] on truncated rows, unknown tags,
    /// out-of-range indirect data, or cells that fail to decode.
    pub fn decode_all(mut self) -> Result<Vec<(RowOperationType, PartialRow)>, RowError> {
        let mut ops = Vec::new();
        while self.pos < self.pb.rows.len() {
            ops.push(self.decode_one()?);
        }
        Ok(ops)
    }

    fn decode_one(&mut self) -> Result<(RowOperationType, PartialRow), RowError> {
        let tag = self.take(1)?[0];
        let op = RowOperationType::from_byte(tag)
            .ok_or_else(|| RowError::malformed(format!("unknown row operation tag {tag}")))?;

        let num_columns = self.schema.num_columns();
        let isset = self.take(bitmap_len(num_columns))?.to_vec();
        let nulls = if self.schema.has_nullables() {
            self.take(bitmap_len(num_columns))?.to_vec()
        } else {
            vec![0u8; bitmap_len(num_columns)]
        };

        let schema = Arc::clone(&self.schema);
        let mut row = PartialRow::new(Arc::clone(&schema));
        for (idx, col) in schema.columns().iter().enumerate() {
            if !bit_set(&isset, idx) {
                continue;
            }
            if bit_set(&nulls, idx) {
                row.put_decoded(idx, None);
                continue;
            }
            let cell = match col.data_type.fixed_size() {
                Some(width) => self.take(width)?.to_vec(),
                None => self.take_indirect()?,
            };
            let value = Value::decode_cell(col.data_type, &cell).ok_or_else(|| {
                RowError::malformed(format!("undecodable cell for column {}", col.name))
            })?;
            row.put_decoded(idx, Some(value));
        }
        Ok((op, row))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], RowError> {
        let pb: &'a RowOperationsPb = self.pb;
        let rows = pb.rows.as_slice();
        let end = self.pos + n;
        let slice = rows
            .get(self.pos..end)
            .ok_or_else(|| RowError::malformed("truncated row"))?;
        self.pos = end;
        Ok(slice)
    }

    fn take_u64(&mut self) -> Result<usize, RowError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        usize::try_from(u64::from_le_bytes(buf))
            .map_err(|_| RowError::malformed("indirect pointer exceeds address space"))
    }

    fn take_indirect(&mut self) -> Result<Vec<u8>, RowError> {
        let offset = self.take_u64()?;
        let len = self.take_u64()?;
        offset
            .checked_add(len)
            .and_then(|end| self.pb.indirect_data.get(offset..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| RowError::malformed("indirect data out of range"))
    }
}
