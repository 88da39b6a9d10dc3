use super::defaults::*;
use colscan_result::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub scan: ScanSettings,
}

/// Where scanned files live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Base URI for relative scan paths (e.g. `hdfs://namenode:9000/warehouse`).
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Per-scan read behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Maximum rows requested from the record reader per pull.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_true")]
    pub skip_corrupt_records: bool,
    #[serde(default = "default_true")]
    pub tolerant_schema_evolution: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            skip_corrupt_records: true,
            tolerant_schema_evolution: true,
        }
    }
}

impl ScanConfig {
    /// Read a setting by dotted key, e.g. `scan.batch_size`.
    pub fn property(&self, key: &str) -> Option<String> {
        match key {
            "storage.endpoint" => self.storage.endpoint.clone(),
            "scan.batch_size" => Some(self.scan.batch_size.to_string()),
            "scan.skip_corrupt_records" => Some(self.scan.skip_corrupt_records.to_string()),
            "scan.tolerant_schema_evolution" => {
                Some(self.scan.tolerant_schema_evolution.to_string())
            }
            _ => None,
        }
    }

    /// Copy of this config with one setting replaced.
    ///
    /// ```
    /// use colscan_config::ScanConfig;
    ///
    /// let cfg = ScanConfig::default().with_property("scan.batch_size", "512").unwrap();
    /// assert_eq!(cfg.scan.batch_size, 512);
    /// assert_eq!(cfg.property("scan.batch_size").as_deref(), Some("512"));
    /// ```
    pub fn with_property(&self, key: &str, value: &str) -> Result<Self> {
        let mut next = self.clone();
        match key {
            "storage.endpoint" => next.storage.endpoint = Some(value.to_string()),
            "scan.batch_size" => next.scan.batch_size = parse_value(key, value)?,
            "scan.skip_corrupt_records" => next.scan.skip_corrupt_records = parse_value(key, value)?,
            "scan.tolerant_schema_evolution" => {
                next.scan.tolerant_schema_evolution = parse_value(key, value)?
            }
            _ => return Err(Error::Config(format!("unknown configuration key '{key}'"))),
        }
        next.validate()?;
        Ok(next)
    }

    /// Resolve a scan path against the configured endpoint.
    ///
    /// Absolute URIs (anything containing `://`) and paths scanned without a
    /// configured endpoint are returned unchanged.
    pub fn resolve_path(&self, path: &str) -> String {
        match &self.storage.endpoint {
            Some(endpoint) if !path.contains("://") => format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => path.to_string(),
        }
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> Result<()> {
        if self.scan.batch_size == 0 {
            return Err(Error::Config("scan.batch_size cannot be 0".to_string()));
        }
        if self
            .storage
            .endpoint
            .as_deref()
            .is_some_and(|endpoint| endpoint.trim().is_empty())
        {
            return Err(Error::Config(
                "storage.endpoint cannot be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid value '{value}' for '{key}': {e}")))
}
