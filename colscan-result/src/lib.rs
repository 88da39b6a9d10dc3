//! Error types and result definitions for the colscan workspace.
//!
//! Every crate in the workspace reports failures through the single [`Error`]
//! enum and the [`Result<T>`] alias, so errors propagate across crate
//! boundaries with `?` and callers can match on variants when they need to
//! react to a specific failure.
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): opening or reading storage resources
//! - **Data format errors** ([`Error::Arrow`]): building output blocks
//! - **Lookup failures** ([`Error::NotFound`]): missing tables or columns
//! - **Caller errors** ([`Error::InvalidArgumentError`]): malformed vectors, bad options
//! - **Configuration errors** ([`Error::Config`]): unreadable or invalid settings
//! - **Storage errors** ([`Error::Storage`]): failures reported by a storage reader
//! - **Staleness** ([`Error::StaleBatch`]): deferred column access after the scan advanced
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
