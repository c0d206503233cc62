use serde::{Deserialize, Serialize};

/// Physical type of a column.
///
/// Serializes in `SCREAMING_SNAKE_CASE` to match the master's wire enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UnixtimeMicros,
    Float,
    Double,
    Bool,
    String,
    Binary,
}

impl DataType {
    /// Width in bytes of a cell of this type, or `None` for variable-length types.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::Bool => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float => Some(4),
            Self::Int64 | Self::UnixtimeMicros | Self::Double => Some(8),
            Self::String | Self::Binary => None,
        }
    }

    /// Whether cells of this type are stored out of line in the indirect data buffer.
    #[must_use]
    pub const fn is_var_len(self) -> bool {
        self.fixed_size().is_none()
    }

    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UnixtimeMicros => "unixtime_micros",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Binary => "binary",
        }
    }
}

/// On-disk encoding requested for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Encoding {
    #[default]
    AutoEncoding,
    PlainEncoding,
    PrefixEncoding,
    Rle,
    DictEncoding,
    BitShuffle,
}

/// Block compression codec requested for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionType {
    #[default]
    DefaultCompression,
    NoCompression,
    Snappy,
    Lz4,
    Zlib,
}

/// A single typed cell value.
///
/// Used for partition bound rows and column default values. NULL is not a
/// variant: call sites that accept NULL wrap the value in an `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    /// Microseconds since the Unix epoch.
    UnixtimeMicros(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
}

impl Value {
    /// The column type this value can be stored in.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UnixtimeMicros(_) => DataType::UnixtimeMicros,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
            Self::Binary(_) => DataType::Binary,
        }
    }

    /// Encodes the cell payload: little-endian for fixed-width types, raw
    /// bytes for strings and binaries.
    #[must_use]
    pub fn encode_cell(&self) -> Vec<u8> {
        match self {
            Self::Bool(v) => vec![u8::from(*v)],
            Self::Int8(v) => v.to_le_bytes().to_vec(),
            Self::Int16(v) => v.to_le_bytes().to_vec(),
            Self::Int32(v) => v.to_le_bytes().to_vec(),
            Self::Int64(v) | Self::UnixtimeMicros(v) => v.to_le_bytes().to_vec(),
            Self::Float(v) => v.to_le_bytes().to_vec(),
            Self::Double(v) => v.to_le_bytes().to_vec(),
            Self::String(v) => v.as_bytes().to_vec(),
            Self::Binary(v) => v.clone(),
        }
    }

    /// Decodes a cell payload produced by [`Value::encode_cell`].
    ///
    /// Returns `None` when the byte length does not match the type width or a
    /// string payload is not valid UTF-8.
    #[must_use]
    pub fn decode_cell(data_type: DataType, bytes: &[u8]) -> Option<Self> {
        if let Some(width) = data_type.fixed_size() {
            if bytes.len() != width {
                return None;
            }
        }
        let value = match data_type {
            DataType::Bool => Self::Bool(bytes[0] != 0),
            DataType::Int8 => Self::Int8(i8::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Int16 => Self::Int16(i16::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Int32 => Self::Int32(i32::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Int64 => Self::Int64(i64::from_le_bytes(bytes.try_into().ok()?)),
            DataType::UnixtimeMicros => {
                Self::UnixtimeMicros(i64::from_le_bytes(bytes.try_into().ok()?))
            }
            DataType::Float => Self::Float(f32::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Double => Self::Double(f64::from_le_bytes(bytes.try_into().ok()?)),
            DataType::String => Self::String(String::from_utf8(bytes.to_vec()).ok()?),
            DataType::Binary => Self::Binary(bytes.to_vec()),
        };
        Some(value)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}
