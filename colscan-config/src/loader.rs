use super::types::ScanConfig;
use colscan_result::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds `colscan.toml`.
pub const ENV_HOME: &str = "COLSCAN_HOME";
pub const ENV_BATCH_SIZE: &str = "COLSCAN_BATCH_SIZE";
pub const ENV_STORAGE_ENDPOINT: &str = "COLSCAN_STORAGE_ENDPOINT";
pub const CONFIG_FILE_NAME: &str = "colscan.toml";

/// Default configuration shipped with the crate.
pub const BUNDLED_CONFIG: &str = include_str!("../colscan.toml");

impl ScanConfig {
    /// Load configuration from a TOML file.
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded scan configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScanConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The bundled default configuration.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CONFIG)
    }

    /// Load from the process environment: `$COLSCAN_HOME/colscan.toml` if
    /// the variable is set, the bundled default otherwise, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`ScanConfig::load`] with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match lookup(ENV_HOME) {
            Some(home) => {
                let path: PathBuf = Path::new(&home).join(CONFIG_FILE_NAME);
                Self::from_file(path)?
            }
            None => {
                tracing::debug!("{ENV_HOME} not set, using bundled configuration");
                Self::bundled()?
            }
        };
        base.apply_overrides_with(lookup)
    }

    /// Apply `COLSCAN_*` overrides from the process environment.
    pub fn apply_env_overrides(&self) -> Result<Self> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides_with<F>(&self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.clone();
        if let Some(batch_size) = lookup(ENV_BATCH_SIZE) {
            config = config.with_property("scan.batch_size", &batch_size)?;
        }
        if let Some(endpoint) = lookup(ENV_STORAGE_ENDPOINT) {
            config = config.with_property("storage.endpoint", &endpoint)?;
        }
        Ok(config)
    }
}
