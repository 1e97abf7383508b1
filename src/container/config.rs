//! Writer configuration
//!
//! Loaded from JSON with per-field defaults, so an empty object `{}` is a
//! complete configuration:
//!
//! ```json
//! {
//!   "block_records": 100,
//!   "block_bytes": 65536,
//!   "checksum": "crc32",
//!   "overwrite": true,
//!   "metadata": { "origin": "demo" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::checksum::ChecksumMode;
use super::errors::{ContainerError, ContainerResult};
use super::header::RESERVED_PREFIX;
use super::MAX_BLOCK_RECORDS;

/// Container writer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Flush a block once it holds this many records (default 100)
    #[serde(default = "default_block_records")]
    pub block_records: u64,

    /// Flush a block once its encoded data reaches this many bytes
    /// (default 64KB)
    #[serde(default = "default_block_bytes")]
    pub block_bytes: usize,

    /// Per-block checksum (default crc32)
    #[serde(default)]
    pub checksum: ChecksumMode,

    /// Truncate an existing destination file (default true). When false,
    /// `create` fails if the file exists.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// User metadata stored in the header. Keys must not start with
    /// `genrec.`.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_block_records() -> u64 {
    100
}
fn default_block_bytes() -> usize {
    64 * 1024
}
fn default_overwrite() -> bool {
    true
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            block_records: default_block_records(),
            block_bytes: default_block_bytes(),
            checksum: ChecksumMode::default(),
            overwrite: default_overwrite(),
            metadata: BTreeMap::new(),
        }
    }
}

impl WriterConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> ContainerResult<Self> {
        let config: WriterConfig = serde_json::from_str(text)
            .map_err(|e| ContainerError::config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style metadata insertion
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks block limits and metadata keys.
    pub fn validate(&self) -> ContainerResult<()> {
        if self.block_records == 0 || self.block_records > MAX_BLOCK_RECORDS {
            return Err(ContainerError::config(format!(
                "block_records must be between 1 and {}, got {}",
                MAX_BLOCK_RECORDS, self.block_records
            )));
        }
        if self.block_bytes == 0 {
            return Err(ContainerError::config("block_bytes must be greater than 0"));
        }
        if let Some(key) = self.metadata.keys().find(|k| k.starts_with(RESERVED_PREFIX)) {
            return Err(ContainerError::config(format!(
                "metadata key '{}' uses the reserved '{}' prefix",
                key, RESERVED_PREFIX
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = WriterConfig::from_json("{}").unwrap();
        assert_eq!(config, WriterConfig::default());
        assert_eq!(config.block_records, 100);
        assert_eq!(config.checksum, ChecksumMode::Crc32);
        assert!(config.overwrite);
    }

    #[test]
    fn test_json_overrides() {
        let config = WriterConfig::from_json(
            r#"{"block_records": 2, "checksum": "none", "overwrite": false, "metadata": {"origin": "test"}}"#,
        )
        .unwrap();
        assert_eq!(config.block_records, 2);
        assert_eq!(config.checksum, ChecksumMode::None);
        assert!(!config.overwrite);
        assert_eq!(config.metadata.get("origin").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(WriterConfig::from_json(r#"{"block_records": 0}"#).is_err());
        assert!(WriterConfig::from_json(r#"{"block_bytes": 0}"#).is_err());
    }

    #[test]
    fn test_reserved_metadata_key_rejected() {
        let config = WriterConfig::default().with_metadata("genrec.schema", "x");
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "GENREC_CONTAINER_CONFIG");
    }

    #[test]
    fn test_unknown_checksum_rejected() {
        assert!(WriterConfig::from_json(r#"{"checksum": "md5"}"#).is_err());
    }
}
