//! Configuration for colscan.
//!
//! Configuration is an immutable [`ScanConfig`] value built once at startup
//! and passed to whatever needs it. There is no process-wide registry.
//!
//! Loading order:
//! 1. `$COLSCAN_HOME/colscan.toml` when `COLSCAN_HOME` is set, otherwise
//!    the default file bundled into the binary.
//! 2. Environment overrides (`COLSCAN_BATCH_SIZE`,
//!    `COLSCAN_STORAGE_ENDPOINT`).
//! 3. Validation.

mod defaults;
mod loader;
mod types;

pub use loader::{BUNDLED_CONFIG, CONFIG_FILE_NAME, ENV_BATCH_SIZE, ENV_HOME, ENV_STORAGE_ENDPOINT};
pub use types::{ScanConfig, ScanSettings, StorageSettings};
