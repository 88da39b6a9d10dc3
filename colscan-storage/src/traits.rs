use std::sync::Arc;

use colscan_result::Result;
use colscan_types::RowBatch;

use crate::options::ReadOptions;

/// Opens storage resources by path.
pub trait StorageOpener {
    type Reader: StorageReader + 'static;

    fn open(&self, path: &str) -> Result<Self::Reader>;
}

/// An open storage resource.
pub trait StorageReader {
    /// Start reading with the given column selection and predicate.
    fn read(&mut self, options: &ReadOptions) -> Result<Box<dyn RecordReader>>;

    /// Release the resource. Callers invoke this at most once.
    fn close(&mut self) -> Result<()>;
}

/// Batch-at-a-time record source produced by [`StorageReader::read`].
pub trait RecordReader {
    /// Read up to `max_rows` rows.
    ///
    /// The batch carrying the last rows may already have `end_of_file`
    /// set; after that, readers return empty batches.
    fn read_batch(&mut self, max_rows: usize) -> Result<RowBatch>;

    /// Bytes consumed from storage so far. Never decreases.
    fn completed_bytes(&self) -> u64;
}

impl<T> StorageOpener for &T
where
    T: StorageOpener + ?Sized,
{
    type Reader = T::Reader;

    fn open(&self, path: &str) -> Result<Self::Reader> {
        (**self).open(path)
    }
}

impl<T> StorageOpener for Arc<T>
where
    T: StorageOpener + ?Sized,
{
    type Reader = T::Reader;

    fn open(&self, path: &str) -> Result<Self::Reader> {
        (**self).open(path)
    }
}
