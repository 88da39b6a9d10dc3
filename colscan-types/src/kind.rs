//! Scalar kinds and column handles.

use std::fmt;

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

/// Declared scalar kind of a column.
///
/// The set is closed: every kind the scan layer knows how to decode has its
/// own variant, and anything else is carried as [`ScalarKind::Unsupported`]
/// with its original type name so it can still be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// 64-bit signed integers.
    Integer,
    /// 64-bit floating point values.
    Floating,
    /// UTF-8 text backed by a shared byte buffer.
    Text,
    /// Booleans stored as 0/1 integers.
    Boolean,
    /// Any declared type the scan layer does not decode. Rows surface as nulls.
    Unsupported(String),
}

impl ScalarKind {
    /// Map an engine type name onto a kind.
    ///
    /// Matching ignores ASCII case and a trailing length/precision suffix,
    /// so `VARCHAR(32)` resolves to [`ScalarKind::Text`].
    ///
    /// ```
    /// use colscan_types::ScalarKind;
    ///
    /// assert_eq!(ScalarKind::from_type_name("bigint"), ScalarKind::Integer);
    /// assert_eq!(ScalarKind::from_type_name("VARCHAR(32)"), ScalarKind::Text);
    /// assert_eq!(
    ///     ScalarKind::from_type_name("timestamp"),
    ///     ScalarKind::Unsupported("timestamp".into())
    /// );
    /// ```
    pub fn from_type_name(name: &str) -> Self {
        let base = name.split('(').next().unwrap_or(name).trim();
        match base.to_ascii_lowercase().as_str() {
            "integer" | "int" | "bigint" | "long" => ScalarKind::Integer,
            "double" | "float" | "real" => ScalarKind::Floating,
            "varchar" | "string" | "text" => ScalarKind::Text,
            "boolean" | "bool" => ScalarKind::Boolean,
            _ => ScalarKind::Unsupported(name.to_string()),
        }
    }

    /// Arrow type of the blocks produced for this kind.
    pub fn arrow_type(&self) -> DataType {
        match self {
            ScalarKind::Integer => DataType::Int64,
            ScalarKind::Floating => DataType::Float64,
            ScalarKind::Text => DataType::Utf8View,
            ScalarKind::Boolean => DataType::Boolean,
            ScalarKind::Unsupported(_) => DataType::Null,
        }
    }

    #[inline]
    pub fn is_supported(&self) -> bool {
        !matches!(self, ScalarKind::Unsupported(_))
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Integer => f.write_str("integer"),
            ScalarKind::Floating => f.write_str("double"),
            ScalarKind::Text => f.write_str("varchar"),
            ScalarKind::Boolean => f.write_str("boolean"),
            ScalarKind::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Immutable descriptor of one column in the underlying schema.
///
/// `ordinal` is the column's stable position in the physical schema; storage
/// readers use it to correlate predicate references with physical columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnHandle {
    name: String,
    kind: ScalarKind,
    ordinal: usize,
}

impl ColumnHandle {
    pub fn new(name: impl Into<String>, kind: ScalarKind, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            ordinal,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &ScalarKind {
        &self.kind
    }

    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

impl fmt::Display for ColumnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.name, self.kind, self.ordinal)
    }
}
