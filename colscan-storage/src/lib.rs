//! Storage reader interface for colscan.
//!
//! A scan talks to storage through three traits:
//!
//! - [`StorageOpener`] turns a path into a [`StorageReader`].
//! - [`StorageReader::read`] applies [`ReadOptions`] (column pruning and a
//!   pushed-down [`PredicateDescription`]) and returns a [`RecordReader`].
//! - [`RecordReader::read_batch`] yields one [`RowBatch`] per call.
//!
//! File formats, compression, and predicate evaluation strategy are the
//! reader's business. [`MemStorage`] is an in-memory implementation used by
//! tests and examples.

pub mod mem;
pub mod options;
pub mod predicate;
pub mod traits;

pub use mem::{MemReader, MemStorage, MemTable};
pub use options::ReadOptions;
pub use predicate::{ColumnReference, PredicateDescription};
pub use traits::{RecordReader, StorageOpener, StorageReader};

pub use colscan_types::RowBatch;
