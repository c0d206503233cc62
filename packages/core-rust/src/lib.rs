//! Tabula Core: table schemas, partial rows, row operation encoding, and
//! master message schemas.

pub mod error;
pub mod messages;
pub mod row;
pub mod row_codec;
pub mod schema;
pub mod types;
pub mod wire;

pub use error::{RowError, SchemaError};
pub use row::PartialRow;
pub use row_codec::{RowOperationsDecoder, RowOperationsEncoder};
pub use schema::{ColumnSchema, ColumnSchemaDelta, Schema};
pub use types::{CompressionType, DataType, Encoding, Value};
pub use wire::SchemaEncodeFlags;
