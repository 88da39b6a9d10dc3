//! Column vectors and row batches handed up by storage readers.

use std::fmt;

use arrow::buffer::Buffer;

use crate::kind::ScalarKind;
use crate::value::ScalarValue;

/// Values of one column for every row of a batch.
///
/// Text columns share a single reference-counted byte buffer and address
/// rows by `(offset, length)` pairs, so slicing or filtering a text vector
/// never copies string data.
#[derive(Debug, Clone)]
pub enum ColumnVector {
    /// Fixed-width integers. Boolean columns also travel as 0/1 longs.
    Long(Vec<i64>),
    /// Fixed-width floats.
    Double(Vec<f64>),
    /// Shared byte buffer plus per-row `(offset, length)` slices.
    Bytes { buffer: Buffer, slices: Vec<(u32, u32)> },
    /// Column absent from the stored data; every row reads as null.
    Missing { len: usize },
}

impl ColumnVector {
    /// Build a text vector whose rows all point into one shared buffer.
    ///
    /// ```
    /// use colscan_types::ColumnVector;
    ///
    /// let v = ColumnVector::text(["ab", "cde"]);
    /// assert_eq!(v.len(), 2);
    /// assert_eq!(v.text_at(1), Some("cde"));
    /// ```
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bytes = Vec::new();
        let mut slices = Vec::new();
        for value in values {
            let value = value.as_ref().as_bytes();
            slices.push((bytes.len() as u32, value.len() as u32));
            bytes.extend_from_slice(value);
        }
        ColumnVector::Bytes {
            buffer: Buffer::from_vec(bytes),
            slices,
        }
    }

    /// Boolean column in its 0/1 long representation.
    pub fn booleans(values: impl IntoIterator<Item = bool>) -> Self {
        ColumnVector::Long(values.into_iter().map(i64::from).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnVector::Long(v) => v.len(),
            ColumnVector::Double(v) => v.len(),
            ColumnVector::Bytes { slices, .. } => slices.len(),
            ColumnVector::Missing { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short label for diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            ColumnVector::Long(_) => "long",
            ColumnVector::Double(_) => "double",
            ColumnVector::Bytes { .. } => "bytes",
            ColumnVector::Missing { .. } => "missing",
        }
    }

    /// Raw bytes of text row `row`, if this is a text vector.
    pub fn bytes_at(&self, row: usize) -> Option<&[u8]> {
        match self {
            ColumnVector::Bytes { buffer, slices } => {
                let (offset, len) = *slices.get(row)?;
                let start = offset as usize;
                buffer.as_slice().get(start..start + len as usize)
            }
            _ => None,
        }
    }

    pub fn text_at(&self, row: usize) -> Option<&str> {
        self.bytes_at(row)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Read row `row` interpreted as `kind`; `None` means null.
    pub fn value_at(&self, row: usize, kind: &ScalarKind) -> Option<ScalarValue> {
        match (self, kind) {
            (ColumnVector::Long(v), ScalarKind::Boolean) => {
                v.get(row).map(|x| ScalarValue::Boolean(*x == 1))
            }
            (ColumnVector::Long(v), _) => v.get(row).copied().map(ScalarValue::Integer),
            (ColumnVector::Double(v), _) => v.get(row).copied().map(ScalarValue::Floating),
            (ColumnVector::Bytes { .. }, _) => {
                self.text_at(row).map(|s| ScalarValue::Text(s.to_string()))
            }
            (ColumnVector::Missing { .. }, _) => None,
        }
    }

    /// Select `rows` (in order) into a new vector.
    ///
    /// Text vectors keep sharing the original buffer; only the slice table
    /// is rebuilt.
    pub fn take(&self, rows: &[usize]) -> ColumnVector {
        match self {
            ColumnVector::Long(v) => ColumnVector::Long(rows.iter().map(|&r| v[r]).collect()),
            ColumnVector::Double(v) => ColumnVector::Double(rows.iter().map(|&r| v[r]).collect()),
            ColumnVector::Bytes { buffer, slices } => ColumnVector::Bytes {
                buffer: buffer.clone(),
                slices: rows.iter().map(|&r| slices[r]).collect(),
            },
            ColumnVector::Missing { .. } => ColumnVector::Missing { len: rows.len() },
        }
    }
}

/// One pull's worth of data from a record reader.
///
/// `projected_columns[i]` is the index into `columns` holding the vector
/// for the i-th requested column.
#[derive(Debug, Clone)]
pub struct RowBatch {
    pub row_count: usize,
    pub columns: Vec<ColumnVector>,
    pub projected_columns: Vec<usize>,
    pub end_of_file: bool,
}

impl RowBatch {
    /// Batch whose columns are already in request order.
    pub fn new(row_count: usize, columns: Vec<ColumnVector>, end_of_file: bool) -> Self {
        let projected_columns = (0..columns.len()).collect();
        Self {
            row_count,
            columns,
            projected_columns,
            end_of_file,
        }
    }

    /// Batch with no rows.
    pub fn empty(end_of_file: bool) -> Self {
        Self {
            row_count: 0,
            columns: Vec::new(),
            projected_columns: Vec::new(),
            end_of_file,
        }
    }

    pub fn with_projection(mut self, projected_columns: Vec<usize>) -> Self {
        self.projected_columns = projected_columns;
        self
    }

    /// Vector backing the `field`-th requested column.
    pub fn projected_column(&self, field: usize) -> Option<&ColumnVector> {
        let idx = *self.projected_columns.get(field)?;
        self.columns.get(idx)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Sequence number of the batch a scan currently holds.
///
/// Starts at zero before the first pull and is bumped before every pull, so
/// the first batch is generation 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchGeneration(u64);

impl BatchGeneration {
    pub const INITIAL: BatchGeneration = BatchGeneration(0);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn next(self) -> BatchGeneration {
        BatchGeneration(self.0 + 1)
    }
}

impl fmt::Display for BatchGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
