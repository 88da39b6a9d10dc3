//! colscan: columnar scans into Arrow blocks
//!
//! This crate is the entrypoint for the colscan toolkit. It re-exports the
//! scan adapter, the storage contracts it reads through and the value types
//! used to describe columns and constraints.
//!
//! # Quick Start
//!
//! ```rust
//! use colscan::{ColumnHandle, ColumnVector, Domain, ScalarKind, ScanAdapter, ScanConfig, TupleDomain};
//! use colscan::storage::{MemStorage, MemTable};
//!
//! let name = ColumnHandle::new("name", ScalarKind::Text, 0);
//! let score = ColumnHandle::new("score", ScalarKind::Floating, 1);
//! let storage = MemStorage::new();
//! storage.insert_table(
//!     "scores",
//!     MemTable::new(
//!         vec![name.clone(), score.clone()],
//!         vec![
//!             ColumnVector::text(["ada", "bob", "cy"]),
//!             ColumnVector::Double(vec![9.5, 4.0, 7.25]),
//!         ],
//!     )
//!     .unwrap(),
//! );
//!
//! let constraint = TupleDomain::all().with_domain(score.clone(), Domain::range(5.0, 10.0));
//! let config = ScanConfig::default();
//! let scan = colscan::open_scan(&storage, "scores", vec![name, score], &constraint, &config);
//! let rows: usize = scan.map(|batch| batch.row_count()).sum();
//! assert_eq!(rows, 2);
//! ```
//!
//! # Architecture
//!
//! - **Values** (`colscan-types`): column kinds, constraints and the row
//!   batches storage hands back.
//! - **Storage** (`colscan-storage`): reader traits, read options, the
//!   pushed-down predicate and an in-memory implementation.
//! - **Scan** (`colscan-scan`): predicate building, typed decoding, the
//!   scan lifecycle and lazy column loading.
//! - **Config** (`colscan-config`): scan settings loaded from TOML and the
//!   environment.

pub use colscan_scan::{
    LazyBatch, LazyColumnLoader, OutputBatch, PredicateBuilder, ScanAdapter, ScanFailure,
    ScanMetrics, ScanOptions, ScanPhase, TypeDecoder,
};

pub use colscan_types::{
    BatchGeneration, ColumnHandle, ColumnVector, Domain, RowBatch, ScalarKind, ScalarValue,
    TupleDomain, ValueRange,
};

pub use colscan_config::ScanConfig;

pub mod storage {
    //! Storage reader contracts and the in-memory backend.

    pub use colscan_storage::{
        ColumnReference, MemStorage, MemTable, PredicateDescription, ReadOptions, RecordReader,
        StorageOpener, StorageReader,
    };
}

pub mod config {
    //! Configuration loading.

    pub use colscan_config::*;
}

// Re-export result types for error handling
pub use colscan_result::{Error, Result};

/// Open a scan with options taken from `config`.
///
/// `path` is resolved against the configured storage endpoint before it is
/// handed to `opener`.
pub fn open_scan<O>(
    opener: &O,
    path: &str,
    columns: Vec<ColumnHandle>,
    constraint: &TupleDomain,
    config: &ScanConfig,
) -> ScanAdapter
where
    O: storage::StorageOpener + ?Sized,
{
    ScanAdapter::open(
        opener,
        &config.resolve_path(path),
        columns,
        constraint,
        ScanOptions::from_config(config),
    )
}
