//! Typed decoding of column vectors into Arrow blocks.
//!
//! [`TypeDecoder`] picks a copy routine per [`ScalarKind`]; [`BlockBuilder`]
//! is the output side, a closed set of Arrow builders behind one write
//! protocol.

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, NullBuilder, StringViewBuilder,
};
use arrow::buffer::Buffer;
use colscan_result::{Error, Result};
use colscan_types::{ColumnVector, ScalarKind, ScalarValue};
use std::sync::Arc;

/// Builder for one output block.
pub enum BlockBuilder {
    Integer(Int64Builder),
    Floating(Float64Builder),
    Text(TextBlockBuilder),
    Boolean(BooleanBuilder),
    Null(NullBuilder),
}

/// String view builder that registers each shared source buffer once.
///
/// Rows are appended as `(block, offset, length)` views into the registered
/// buffers, so no per-row string is allocated and the source bytes are
/// shared with the output array rather than copied.
pub struct TextBlockBuilder {
    inner: StringViewBuilder,
    registered: Vec<(usize, usize, u32)>,
}

impl TextBlockBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: StringViewBuilder::with_capacity(capacity),
            registered: Vec::new(),
        }
    }

    fn block_for(&mut self, buffer: &Buffer) -> u32 {
        let key = (buffer.as_ptr() as usize, buffer.len());
        if let Some((_, _, block)) = self
            .registered
            .iter()
            .find(|(ptr, len, _)| (*ptr, *len) == key)
        {
            return *block;
        }
        let block = self.inner.append_block(buffer.clone());
        self.registered.push((key.0, key.1, block));
        block
    }

    fn append_slice(&mut self, buffer: &Buffer, offset: u32, len: u32) -> Result<()> {
        let end = offset as usize + len as usize;
        if end > buffer.len() {
            return Err(Error::InvalidArgumentError(format!(
                "text slice {offset}+{len} exceeds buffer of {} bytes",
                buffer.len()
            )));
        }
        let block = self.block_for(buffer);
        self.inner.try_append_view(block, offset, len)?;
        Ok(())
    }
}

impl BlockBuilder {
    /// Builder producing the Arrow type of `kind` with room for `capacity` rows.
    pub fn new(kind: &ScalarKind, capacity: usize) -> Self {
        match kind {
            ScalarKind::Integer => BlockBuilder::Integer(Int64Builder::with_capacity(capacity)),
            ScalarKind::Floating => BlockBuilder::Floating(Float64Builder::with_capacity(capacity)),
            ScalarKind::Text => BlockBuilder::Text(TextBlockBuilder::with_capacity(capacity)),
            ScalarKind::Boolean => BlockBuilder::Boolean(BooleanBuilder::with_capacity(capacity)),
            ScalarKind::Unsupported(_) => BlockBuilder::Null(NullBuilder::new()),
        }
    }

    /// Append one value. The value's kind must match the builder.
    pub fn write_scalar(&mut self, value: ScalarValue) -> Result<()> {
        match (self, value) {
            (BlockBuilder::Integer(b), ScalarValue::Integer(v)) => b.append_value(v),
            (BlockBuilder::Floating(b), ScalarValue::Floating(v)) => b.append_value(v),
            (BlockBuilder::Floating(b), ScalarValue::Integer(v)) => b.append_value(v as f64),
            (BlockBuilder::Text(b), ScalarValue::Text(v)) => b.inner.append_value(v),
            (BlockBuilder::Boolean(b), ScalarValue::Boolean(v)) => b.append_value(v),
            (builder, value) => {
                return Err(Error::InvalidArgumentError(format!(
                    "cannot write {} value into {} block",
                    value.kind(),
                    builder.name()
                )));
            }
        }
        Ok(())
    }

    /// Append a row referencing `len` bytes at `offset` of a shared buffer.
    pub fn write_slice(&mut self, buffer: &Buffer, offset: u32, len: u32) -> Result<()> {
        match self {
            BlockBuilder::Text(b) => b.append_slice(buffer, offset, len),
            other => Err(Error::InvalidArgumentError(format!(
                "cannot write a byte slice into {} block",
                other.name()
            ))),
        }
    }

    pub fn append_null(&mut self) {
        self.append_nulls(1);
    }

    pub fn append_nulls(&mut self, n: usize) {
        match self {
            BlockBuilder::Integer(b) => b.append_nulls(n),
            BlockBuilder::Floating(b) => b.append_nulls(n),
            BlockBuilder::Text(b) => (0..n).for_each(|_| b.inner.append_null()),
            BlockBuilder::Boolean(b) => b.append_nulls(n),
            BlockBuilder::Null(b) => b.append_nulls(n),
        }
    }

    /// Finish the block.
    pub fn build(self) -> ArrayRef {
        match self {
            BlockBuilder::Integer(mut b) => Arc::new(b.finish()),
            BlockBuilder::Floating(mut b) => Arc::new(b.finish()),
            BlockBuilder::Text(mut b) => Arc::new(b.inner.finish()),
            BlockBuilder::Boolean(mut b) => Arc::new(b.finish()),
            BlockBuilder::Null(mut b) => Arc::new(b.finish()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BlockBuilder::Integer(_) => "integer",
            BlockBuilder::Floating(_) => "double",
            BlockBuilder::Text(_) => "varchar",
            BlockBuilder::Boolean(_) => "boolean",
            BlockBuilder::Null(_) => "null",
        }
    }
}

/// Stateless per-kind decoder.
pub struct TypeDecoder;

impl TypeDecoder {
    /// Decode `vector` as `kind` into a block of exactly `row_count` rows.
    ///
    /// Row order is preserved. Unsupported kinds, and columns the storage
    /// reader reported as missing, produce `row_count` nulls. A vector whose
    /// length or representation does not fit the kind is rejected with
    /// [`Error::InvalidArgumentError`].
    pub fn decode(kind: &ScalarKind, vector: &ColumnVector, row_count: usize) -> Result<ArrayRef> {
        let mut builder = BlockBuilder::new(kind, row_count);
        if matches!(kind, ScalarKind::Unsupported(_))
            || matches!(vector, ColumnVector::Missing { .. })
        {
            builder.append_nulls(row_count);
            return Ok(builder.build());
        }
        if vector.len() != row_count {
            return Err(Error::InvalidArgumentError(format!(
                "{} vector has {} rows, batch has {row_count}",
                vector.variant_name(),
                vector.len()
            )));
        }

        match (kind, vector, &mut builder) {
            (ScalarKind::Integer, ColumnVector::Long(values), BlockBuilder::Integer(b)) => {
                b.append_slice(values);
            }
            (ScalarKind::Floating, ColumnVector::Double(values), BlockBuilder::Floating(b)) => {
                b.append_slice(values);
            }
            (ScalarKind::Text, ColumnVector::Bytes { buffer, slices }, BlockBuilder::Text(b)) => {
                for &(offset, len) in slices {
                    b.append_slice(buffer, offset, len)?;
                }
            }
            (ScalarKind::Boolean, ColumnVector::Long(values), BlockBuilder::Boolean(b)) => {
                for &v in values {
                    b.append_value(v == 1);
                }
            }
            (kind, vector, _) => {
                return Err(Error::InvalidArgumentError(format!(
                    "{kind} column cannot be decoded from a {} vector",
                    vector.variant_name()
                )));
            }
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringViewArray};
    use arrow::datatypes::DataType;

    #[test]
    fn integers_round_trip_in_order() {
        let vector = ColumnVector::Long(vec![3, -1, 0, 42, 7]);
        let block = TypeDecoder::decode(&ScalarKind::Integer, &vector, 5).unwrap();
        let ints = block.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ints.values().to_vec(), vec![3, -1, 0, 42, 7]);
        assert_eq!(ints.null_count(), 0);
    }

    #[test]
    fn floats_copy_element_wise() {
        let vector = ColumnVector::Double(vec![0.5, -2.25]);
        let block = TypeDecoder::decode(&ScalarKind::Floating, &vector, 2).unwrap();
        let floats = block.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(floats.values().to_vec(), vec![0.5, -2.25]);
    }

    #[test]
    fn text_rows_are_views_into_the_shared_buffer() {
        let buffer = Buffer::from_vec(b"abcde".to_vec());
        let vector = ColumnVector::Bytes {
            buffer: buffer.clone(),
            slices: vec![(0, 2), (2, 3)],
        };
        let block = TypeDecoder::decode(&ScalarKind::Text, &vector, 2).unwrap();
        let text = block.as_any().downcast_ref::<StringViewArray>().unwrap();
        assert_eq!(text.value(0), "ab");
        assert_eq!(text.value(1), "cde");
        // The whole source buffer is registered once, never once per row.
        assert_eq!(text.data_buffers().len(), 1);
        assert_eq!(text.data_buffers()[0].as_ptr(), buffer.as_ptr());
    }

    #[test]
    fn long_text_rows_point_into_the_source() {
        let long = "a string well past the inline limit";
        let vector = ColumnVector::text([long, "short"]);
        let block = TypeDecoder::decode(&ScalarKind::Text, &vector, 2).unwrap();
        let text = block.as_any().downcast_ref::<StringViewArray>().unwrap();
        assert_eq!(text.value(0), long);
        assert_eq!(text.value(1), "short");
        let ColumnVector::Bytes { buffer, .. } = &vector else {
            unreachable!()
        };
        assert_eq!(text.data_buffers()[0].as_ptr(), buffer.as_ptr());
    }

    #[test]
    fn booleans_treat_only_one_as_true() {
        let vector = ColumnVector::Long(vec![1, 0, 2, -1, 1]);
        let block = TypeDecoder::decode(&ScalarKind::Boolean, &vector, 5).unwrap();
        let flags = block.as_any().downcast_ref::<BooleanArray>().unwrap();
        let got: Vec<bool> = flags.iter().map(|v| v.unwrap()).collect();
        assert_eq!(got, vec![true, false, false, false, true]);
    }

    #[test]
    fn unsupported_kind_fills_nulls() {
        let vector = ColumnVector::Long(vec![1, 2, 3]);
        let kind = ScalarKind::Unsupported("timestamp".into());
        let block = TypeDecoder::decode(&kind, &vector, 3).unwrap();
        assert_eq!(block.data_type(), &DataType::Null);
        assert_eq!(block.len(), 3);
        assert_eq!(block.logical_nulls().map(|n| n.null_count()), Some(3));
    }

    #[test]
    fn missing_column_fills_typed_nulls() {
        let vector = ColumnVector::Missing { len: 2 };
        let block = TypeDecoder::decode(&ScalarKind::Integer, &vector, 2).unwrap();
        assert_eq!(block.data_type(), &DataType::Int64);
        assert_eq!(block.null_count(), 2);
    }

    #[test]
    fn wrong_length_is_a_contract_violation() {
        let vector = ColumnVector::Long(vec![1, 2]);
        let err = TypeDecoder::decode(&ScalarKind::Integer, &vector, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }

    #[test]
    fn wrong_representation_is_a_contract_violation() {
        let vector = ColumnVector::Double(vec![1.0]);
        let err = TypeDecoder::decode(&ScalarKind::Text, &vector, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(msg) if msg.contains("double")));
    }

    #[test]
    fn builder_protocol_supports_scalar_and_null_writes() {
        let mut builder = BlockBuilder::new(&ScalarKind::Text, 3);
        builder.write_scalar("x".into()).unwrap();
        builder.append_null();
        builder
            .write_slice(&Buffer::from_vec(b"yz".to_vec()), 1, 1)
            .unwrap();
        assert!(builder.write_scalar(1.into()).is_err());
        let block = builder.build();
        let text = block.as_any().downcast_ref::<StringViewArray>().unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text.value(0), "x");
        assert!(text.is_null(1));
        assert_eq!(text.value(2), "z");
    }

    #[test]
    fn out_of_range_slice_is_rejected() {
        let mut builder = BlockBuilder::new(&ScalarKind::Text, 1);
        let err = builder
            .write_slice(&Buffer::from_vec(b"ab".to_vec()), 1, 5)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }
}
