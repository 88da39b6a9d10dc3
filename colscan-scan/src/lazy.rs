//! Deferred per-column decoding.
//!
//! A [`LazyColumnLoader`] remembers which batch generation it was issued
//! for. Loading checks that the adapter still holds that generation, so a
//! loader can never decode rows from a batch the scan has already moved
//! past or released.

use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use colscan_result::Result;
use colscan_types::{BatchGeneration, ScalarKind};

use crate::adapter::{OutputBatch, ScanAdapter};

/// Deferred decoder for one column of one batch.
#[derive(Debug, Clone)]
pub struct LazyColumnLoader {
    column_index: usize,
    kind: ScalarKind,
    generation: BatchGeneration,
    block: Option<ArrayRef>,
}

impl LazyColumnLoader {
    pub(crate) fn new(column_index: usize, kind: ScalarKind, generation: BatchGeneration) -> Self {
        Self {
            column_index,
            kind,
            generation,
            block: None,
        }
    }

    /// Decode the column, or return the block decoded by an earlier call.
    ///
    /// The first call fails with [`colscan_result::Error::StaleBatch`] if
    /// `adapter` no longer holds the batch this loader was issued for.
    pub fn load(&mut self, adapter: &ScanAdapter) -> Result<ArrayRef> {
        if let Some(block) = &self.block {
            return Ok(ArrayRef::clone(block));
        }
        let batch = adapter.held_batch(self.generation)?;
        let block = adapter.decode_column(batch, self.column_index)?;
        tracing::trace!(
            column = self.column_index,
            generation = %self.generation,
            rows = batch.row_count,
            "loaded lazy column"
        );
        self.block = Some(ArrayRef::clone(&block));
        Ok(block)
    }

    pub fn is_loaded(&self) -> bool {
        self.block.is_some()
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn kind(&self) -> &ScalarKind {
        &self.kind
    }

    pub fn generation(&self) -> BatchGeneration {
        self.generation
    }
}

/// Undecoded batch returned by [`ScanAdapter::next_lazy_batch`].
#[derive(Debug)]
pub struct LazyBatch {
    row_count: usize,
    generation: BatchGeneration,
    loaders: Vec<LazyColumnLoader>,
    schema: SchemaRef,
}

impl LazyBatch {
    pub(crate) fn new(
        row_count: usize,
        generation: BatchGeneration,
        loaders: Vec<LazyColumnLoader>,
        schema: SchemaRef,
    ) -> Self {
        Self {
            row_count,
            generation,
            loaders,
            schema,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn generation(&self) -> BatchGeneration {
        self.generation
    }

    pub fn loader(&mut self, index: usize) -> Option<&mut LazyColumnLoader> {
        self.loaders.get_mut(index)
    }

    pub fn into_loaders(self) -> Vec<LazyColumnLoader> {
        self.loaders
    }

    /// Load every column into an [`OutputBatch`].
    pub fn load_all(&mut self, adapter: &ScanAdapter) -> Result<OutputBatch> {
        let blocks = self
            .loaders
            .iter_mut()
            .map(|loader| loader.load(adapter))
            .collect::<Result<Vec<_>>>()?;
        Ok(OutputBatch::new(
            self.row_count,
            blocks,
            SchemaRef::clone(&self.schema),
        ))
    }
}
