//! Shared data model for colscan.
//!
//! These types sit between the storage readers and the scan adapter:
//! column handles describe what the caller asked for, domains describe the
//! value restrictions pushed down to storage, and [`RowBatch`] is one pull's
//! worth of column vectors coming back up.

pub mod domain;
pub mod kind;
pub mod value;
pub mod vector;

pub use domain::{Domain, DomainValues, TupleDomain, ValueRange};
pub use kind::{ColumnHandle, ScalarKind};
pub use value::ScalarValue;
pub use vector::{BatchGeneration, ColumnVector, RowBatch};
