//! Columnar scan adapter.
//!
//! Sits between a storage record reader and a consumer that wants Arrow
//! blocks:
//!
//! - [`PredicateBuilder`] turns a [`TupleDomain`] into the
//!   [`PredicateDescription`] pushed down to storage.
//! - [`TypeDecoder`] copies one column vector into an Arrow block, sharing
//!   text buffers instead of copying them.
//! - [`ScanAdapter`] drives the batch pull loop and owns the scan's
//!   lifecycle and counters.
//! - [`LazyColumnLoader`] defers decoding of a column until it is needed,
//!   guarded by the batch generation it was issued for.
//!
//! ```
//! use colscan_scan::{ScanAdapter, ScanOptions};
//! use colscan_storage::{MemStorage, MemTable};
//! use colscan_types::{ColumnHandle, ColumnVector, Domain, ScalarKind, TupleDomain};
//!
//! let id = ColumnHandle::new("id", ScalarKind::Integer, 0);
//! let storage = MemStorage::new();
//! storage.insert_table(
//!     "t",
//!     MemTable::new(vec![id.clone()], vec![ColumnVector::Long(vec![1, 2, 3])]).unwrap(),
//! );
//!
//! let constraint = TupleDomain::all().with_domain(id.clone(), Domain::range(2, 3));
//! let scan = ScanAdapter::open(&storage, "t", vec![id], &constraint, ScanOptions::default());
//! let rows: usize = scan.map(|batch| batch.row_count()).sum();
//! assert_eq!(rows, 2);
//! ```
//!
//! [`TupleDomain`]: colscan_types::TupleDomain
//! [`PredicateDescription`]: colscan_storage::PredicateDescription

pub mod adapter;
pub mod decode;
pub mod lazy;
pub mod predicate;

pub use adapter::{
    DEFAULT_BATCH_SIZE, OutputBatch, ScanAdapter, ScanFailure, ScanMetrics, ScanOptions,
    ScanPhase, ScanState,
};
pub use decode::{BlockBuilder, TextBlockBuilder, TypeDecoder};
pub use lazy::{LazyBatch, LazyColumnLoader};
pub use predicate::PredicateBuilder;
