//! Pull-driven scan over a storage record reader.
//!
//! A [`ScanAdapter`] is bound to one storage resource and one
//! column/predicate configuration. The caller pulls [`OutputBatch`]es until
//! `None` comes back; the adapter then has closed itself. Failures never
//! escape a pull: they are logged, the resource is released, and the
//! failure is kept for inspection through [`ScanAdapter::failure`].
//!
//! # End of stream
//!
//! A record reader may set `end_of_file` on the same batch that still carries
//! the final rows. That batch is delivered, and the following pull ends the
//! scan without issuing another read. A batch with zero rows ends the scan
//! immediately, whatever its flag says.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::datatypes::{Field, Schema, SchemaRef};
use colscan_config::ScanConfig;
use colscan_result::{Error, Result};
use colscan_storage::{ReadOptions, RecordReader, StorageOpener, StorageReader};
use colscan_types::{BatchGeneration, ColumnHandle, RowBatch, TupleDomain};

use crate::decode::TypeDecoder;
use crate::lazy::{LazyBatch, LazyColumnLoader};
use crate::predicate::PredicateBuilder;

/// Rows requested per pull unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Per-scan read settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub batch_size: usize,
    pub skip_corrupt_records: bool,
    pub tolerant_schema_evolution: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            skip_corrupt_records: true,
            tolerant_schema_evolution: true,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            batch_size: config.scan.batch_size,
            skip_corrupt_records: config.scan.skip_corrupt_records,
            tolerant_schema_evolution: config.scan.tolerant_schema_evolution,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Lifecycle phase of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Uninitialized,
    Reading,
    /// The last delivered batch carried the end-of-file flag.
    EndOfFile,
    Closed,
}

/// Consumption state of a scan.
#[derive(Debug, Clone)]
pub struct ScanState {
    phase: ScanPhase,
    end_of_file_seen: bool,
    generation: BatchGeneration,
    rows_decoded: u64,
    batches_delivered: u64,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            phase: ScanPhase::Uninitialized,
            end_of_file_seen: false,
            generation: BatchGeneration::INITIAL,
            rows_decoded: 0,
            batches_delivered: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == ScanPhase::Closed
    }

    pub fn end_of_file_seen(&self) -> bool {
        self.end_of_file_seen
    }

    pub fn generation(&self) -> BatchGeneration {
        self.generation
    }

    pub fn rows_decoded(&self) -> u64 {
        self.rows_decoded
    }

    /// Pulls that handed back rows. The terminating pull is not counted.
    pub fn batches_delivered(&self) -> u64 {
        self.batches_delivered
    }

    fn read_time_nanos(&self) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.finished_at.unwrap_or_else(Instant::now);
        u64::try_from(end.saturating_duration_since(start).as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Snapshot of a scan's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMetrics {
    pub completed_bytes: u64,
    pub read_time_nanos: u64,
    /// Cumulative rows pulled; a stand-in for memory usage, not a byte count.
    pub rows_decoded: u64,
    /// Batches handed back with rows.
    pub batches: u64,
    pub finished: bool,
}

/// The failure that ended a scan, plus any error raised while cleaning up.
#[derive(Debug)]
pub struct ScanFailure {
    cause: Error,
    suppressed: Option<Error>,
}

impl ScanFailure {
    pub fn new(cause: Error) -> Self {
        Self {
            cause,
            suppressed: None,
        }
    }

    pub fn cause(&self) -> &Error {
        &self.cause
    }

    pub fn suppressed(&self) -> Option<&Error> {
        self.suppressed.as_ref()
    }

    /// Attach a cleanup error. An error identical to the cause is dropped,
    /// and only the first other error is kept.
    pub fn suppress(&mut self, secondary: Error) {
        if secondary.same_cause(&self.cause) {
            return;
        }
        if self.suppressed.is_none() {
            self.suppressed = Some(secondary);
        }
    }

    pub fn into_cause(self) -> Error {
        self.cause
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;
        if let Some(suppressed) = &self.suppressed {
            write!(f, " (suppressed: {suppressed})")?;
        }
        Ok(())
    }
}

/// Decoded blocks of one pull, one per requested column, in request order.
#[derive(Debug, Clone)]
pub struct OutputBatch {
    row_count: usize,
    blocks: Vec<ArrayRef>,
    schema: SchemaRef,
}

impl OutputBatch {
    pub(crate) fn new(row_count: usize, blocks: Vec<ArrayRef>, schema: SchemaRef) -> Self {
        Self {
            row_count,
            blocks,
            schema,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn num_columns(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, index: usize) -> Option<&ArrayRef> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[ArrayRef] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ArrayRef> {
        self.blocks
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Arrow view of this batch, named after the scanned columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let options = RecordBatchOptions::new().with_row_count(Some(self.row_count));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(&self.schema),
            self.blocks.clone(),
            &options,
        )?)
    }
}

/// Batch-pull adapter between a storage reader and a consumer.
///
/// Not meant to be shared: every operation that changes scan state takes
/// `&mut self`.
pub struct ScanAdapter {
    path: String,
    columns: Arc<[ColumnHandle]>,
    schema: SchemaRef,
    options: ScanOptions,
    read_options: ReadOptions,
    reader: Option<Box<dyn StorageReader>>,
    records: Option<Box<dyn RecordReader>>,
    current: Option<RowBatch>,
    state: ScanState,
    completed_bytes: u64,
    failure: Option<ScanFailure>,
}

impl ScanAdapter {
    /// Open `path` through `opener` and prepare to read `columns`.
    ///
    /// Never fails. If the resource cannot be opened or read, the error is
    /// logged and recorded, and the adapter comes back already closed.
    pub fn open<O>(
        opener: &O,
        path: &str,
        columns: impl Into<Arc<[ColumnHandle]>>,
        constraint: &TupleDomain,
        options: ScanOptions,
    ) -> Self
    where
        O: StorageOpener + ?Sized,
    {
        let columns: Arc<[ColumnHandle]> = columns.into();
        let names = columns.iter().map(|c| c.name().to_string()).collect();
        let read_options = ReadOptions::new(names, PredicateBuilder::build(constraint))
            .skip_corrupt_records(options.skip_corrupt_records)
            .tolerant_schema_evolution(options.tolerant_schema_evolution);
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|c| Field::new(c.name(), c.kind().arrow_type(), true))
                .collect::<Vec<_>>(),
        ));

        let mut adapter = Self {
            path: path.to_string(),
            columns,
            schema,
            options,
            read_options,
            reader: None,
            records: None,
            current: None,
            state: ScanState::new(),
            completed_bytes: 0,
            failure: None,
        };

        match adapter.start(opener) {
            Ok(()) => {
                adapter.state.phase = ScanPhase::Reading;
                tracing::debug!(
                    path = %adapter.path,
                    columns = adapter.columns.len(),
                    predicate = %adapter.read_options.predicate(),
                    "scan opened"
                );
            }
            Err(err) => {
                tracing::error!(path = %adapter.path, error = %err, "failed to open scan");
                adapter.fail(err);
            }
        }
        adapter
    }

    fn start<O>(&mut self, opener: &O) -> Result<()>
    where
        O: StorageOpener + ?Sized,
    {
        if self.options.batch_size == 0 {
            return Err(Error::InvalidArgumentError(
                "batch size must be positive".to_string(),
            ));
        }
        let reader = self.reader.insert(Box::new(opener.open(&self.path)?));
        self.records = Some(reader.read(&self.read_options)?);
        Ok(())
    }

    /// Pull and decode the next batch. `None` means the scan is over.
    pub fn next_batch(&mut self) -> Option<OutputBatch> {
        let row_count = self.advance()?;
        match self.decode_current() {
            Ok(blocks) => Some(OutputBatch::new(row_count, blocks, Arc::clone(&self.schema))),
            Err(err) => {
                tracing::error!(
                    path = %self.path,
                    generation = %self.state.generation,
                    error = %err,
                    "failed to decode batch"
                );
                self.fail(err);
                None
            }
        }
    }

    /// Pull the next batch without decoding it.
    ///
    /// Each column is returned as a [`LazyColumnLoader`] that decodes on
    /// first use, as long as the adapter still holds this batch.
    pub fn next_lazy_batch(&mut self) -> Option<LazyBatch> {
        let row_count = self.advance()?;
        let generation = self.state.generation;
        let loaders = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                LazyColumnLoader::new(index, column.kind().clone(), generation)
            })
            .collect();
        Some(LazyBatch::new(
            row_count,
            generation,
            loaders,
            Arc::clone(&self.schema),
        ))
    }

    /// Deferred loader for column `index` of the batch held right now.
    pub fn lazy_column(&self, index: usize) -> Result<LazyColumnLoader> {
        self.held_batch(self.state.generation)?;
        let column = self.columns.get(index).ok_or_else(|| {
            Error::InvalidArgumentError(format!(
                "column index {index} out of range for {} columns",
                self.columns.len()
            ))
        })?;
        Ok(LazyColumnLoader::new(
            index,
            column.kind().clone(),
            self.state.generation,
        ))
    }

    /// Request the next row batch and update scan state.
    ///
    /// Returns the new batch's row count, or `None` once the scan is over.
    fn advance(&mut self) -> Option<usize> {
        if self.state.is_closed() {
            return None;
        }
        if self.state.started_at.is_none() {
            self.state.started_at = Some(Instant::now());
        }
        self.state.generation = self.state.generation.next();
        let generation = self.state.generation;

        if self.state.end_of_file_seen && generation.get() > 1 {
            tracing::debug!(path = %self.path, %generation, "end of file reached, closing scan");
            self.finish();
            return None;
        }

        let batch_size = self.options.batch_size;
        let pulled = match self.records.as_mut() {
            Some(records) => records
                .read_batch(batch_size)
                .map(|batch| (batch, records.completed_bytes())),
            None => Err(Error::Internal(
                "scan is open but holds no record reader".to_string(),
            )),
        };
        let (batch, completed) = match pulled {
            Ok(pulled) => pulled,
            Err(err) => {
                tracing::error!(path = %self.path, %generation, error = %err, "failed to read batch");
                self.fail(err);
                return None;
            }
        };
        self.completed_bytes = self.completed_bytes.max(completed);

        // Release the previous batch before deciding anything about this one.
        self.current = None;
        let row_count = batch.row_count;
        if row_count == 0 {
            tracing::debug!(path = %self.path, %generation, "empty batch, closing scan");
            self.finish();
            return None;
        }
        if batch.end_of_file {
            self.state.end_of_file_seen = true;
            self.state.phase = ScanPhase::EndOfFile;
            tracing::debug!(path = %self.path, %generation, rows = row_count, "end of file");
        }
        self.state.rows_decoded += row_count as u64;
        self.state.batches_delivered += 1;
        self.current = Some(batch);
        Some(row_count)
    }

    fn decode_current(&self) -> Result<Vec<ArrayRef>> {
        let batch = self.held_batch(self.state.generation)?;
        (0..self.columns.len())
            .map(|index| self.decode_column(batch, index))
            .collect()
    }

    pub(crate) fn decode_column(&self, batch: &RowBatch, index: usize) -> Result<ArrayRef> {
        let column = &self.columns[index];
        let vector = batch.projected_column(index).ok_or_else(|| {
            Error::InvalidArgumentError(format!(
                "batch has no vector for column {} (index {index})",
                column.name()
            ))
        })?;
        TypeDecoder::decode(column.kind(), vector, batch.row_count)
    }

    /// The held batch, provided it belongs to `generation`.
    pub(crate) fn held_batch(&self, generation: BatchGeneration) -> Result<&RowBatch> {
        let stale = |current: Option<u64>| Error::StaleBatch {
            expected: generation.get(),
            current,
        };
        if self.state.is_closed() {
            return Err(stale(None));
        }
        if self.state.generation != generation {
            return Err(stale(Some(self.state.generation.get())));
        }
        self.current
            .as_ref()
            .ok_or_else(|| stale(Some(self.state.generation.get())))
    }

    /// Close the scan.
    ///
    /// The first call releases the storage resource and the held batch and
    /// stops the read timer; later calls do nothing. An error from the
    /// storage reader is logged and returned, but the scan is closed either
    /// way and will not try again.
    pub fn close(&mut self) -> Result<()> {
        if self.state.is_closed() {
            return Ok(());
        }
        self.state.phase = ScanPhase::Closed;
        self.state.finished_at = Some(Instant::now());
        self.current = None;
        if let Some(records) = self.records.take() {
            self.completed_bytes = self.completed_bytes.max(records.completed_bytes());
        }
        let Some(mut reader) = self.reader.take() else {
            return Ok(());
        };
        reader.close().inspect_err(|err| {
            tracing::error!(path = %self.path, error = %err, "failed to close storage reader");
        })?;
        tracing::debug!(
            path = %self.path,
            rows = self.state.rows_decoded,
            bytes = self.completed_bytes,
            "scan closed"
        );
        Ok(())
    }

    /// Close after `cause` ended the scan.
    ///
    /// A close error is attached to the returned failure as suppressed
    /// instead of being raised on its own.
    pub fn close_with_suppression(&mut self, cause: Error) -> ScanFailure {
        let mut failure = ScanFailure::new(cause);
        if let Err(secondary) = self.close() {
            failure.suppress(secondary);
        }
        failure
    }

    /// Close at a normal end of stream.
    fn finish(&mut self) {
        if let Err(err) = self.close() {
            self.record(ScanFailure::new(err));
        }
    }

    fn fail(&mut self, cause: Error) {
        let failure = self.close_with_suppression(cause);
        self.record(failure);
    }

    fn record(&mut self, failure: ScanFailure) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn columns(&self) -> &[ColumnHandle] {
        &self.columns
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn read_options(&self) -> &ReadOptions {
        &self.read_options
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn phase(&self) -> ScanPhase {
        self.state.phase
    }

    pub fn batch_generation(&self) -> BatchGeneration {
        self.state.generation
    }

    /// Whether the scan has closed, normally or after a failure.
    pub fn is_finished(&self) -> bool {
        self.state.is_closed()
    }

    /// First failure recorded by this scan, if any.
    pub fn failure(&self) -> Option<&ScanFailure> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<ScanFailure> {
        self.failure.take()
    }

    /// Bytes read from storage so far.
    pub fn completed_bytes(&self) -> u64 {
        self.records
            .as_ref()
            .map_or(self.completed_bytes, |r| r.completed_bytes().max(self.completed_bytes))
    }

    /// Time from the first pull until close (or until now, while open).
    pub fn read_time_nanos(&self) -> u64 {
        self.state.read_time_nanos()
    }

    /// Cumulative rows pulled. Used as a memory usage estimate.
    pub fn memory_usage(&self) -> u64 {
        self.state.rows_decoded
    }

    pub fn metrics(&self) -> ScanMetrics {
        ScanMetrics {
            completed_bytes: self.completed_bytes(),
            read_time_nanos: self.read_time_nanos(),
            rows_decoded: self.state.rows_decoded,
            batches: self.state.batches_delivered,
            finished: self.is_finished(),
        }
    }
}

impl Iterator for ScanAdapter {
    type Item = OutputBatch;

    fn next(&mut self) -> Option<OutputBatch> {
        self.next_batch()
    }
}

impl Drop for ScanAdapter {
    fn drop(&mut self) {
        // Errors are already logged by `close`.
        let _ = self.close();
    }
}

impl fmt::Debug for ScanAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanAdapter")
            .field("path", &self.path)
            .field("columns", &self.columns)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("completed_bytes", &self.completed_bytes)
            .field("failure", &self.failure)
            .finish()
    }
}
