//! Configuration for the share persistence layer
//!
//! This module provides configuration options for the share service and
//! its storage tiers.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default physical key the ephemeral tier keeps its blob under
pub(crate) const DEFAULT_STORAGE_KEY: &str = "amber.shares";
/// Default base URL for generated share links
pub(crate) const DEFAULT_LINK_BASE: &str = "http://localhost/";
/// Default retention bound enforced by cleanup
pub(crate) const DEFAULT_MAX_ENTRIES: usize = 50;
/// Default codec level for link payloads
pub(crate) const DEFAULT_CODEC_LEVEL: i32 = 3;

/// Codec algorithms available for link-embedded payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CodecAlgorithm {
    /// No compression, fastest but produces the longest links
    None,
    /// LZ4 compression, good balance of speed and link length
    Lz4,
    /// Zstandard compression, shortest links but slower
    Zstd,
}

impl Default for CodecAlgorithm {
    fn default() -> Self {
        Self::Zstd
    }
}

impl std::fmt::Display for CodecAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Lz4 => write!(f, "lz4"),
            Self::Zstd => write!(f, "zstd"),
        }
    }
}

impl CodecAlgorithm {
    /// Parse a codec algorithm from a string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            _ => Err(Error::config(format!("Unknown codec algorithm: {}", s))),
        }
    }

    /// Get the name of the codec algorithm
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// Check if compression is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Configuration options for the share service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ShareConfig {
    // Storage configuration
    /// Physical key under which the ephemeral tier stores its blob
    pub storage_key: String,

    // Link settings
    /// Base URL used when building shareable links
    pub link_base: String,
    /// Codec algorithm for link-embedded payloads
    pub codec_algorithm: CodecAlgorithm,
    /// Codec level (0-9, higher = smaller links)
    pub codec_level: i32,

    // Retention policy
    /// Number of entries retained by cleanup when no explicit limit is given
    pub max_entries: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            codec_algorithm: CodecAlgorithm::default(),
            codec_level: DEFAULT_CODEC_LEVEL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl ShareConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the physical key for the ephemeral tier blob
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the base URL for shareable links
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = base.into();
        self
    }

    /// Set the codec algorithm for link payloads
    pub fn with_codec_algorithm(mut self, algorithm: CodecAlgorithm) -> Self {
        self.codec_algorithm = algorithm;
        self
    }

    /// Set the codec level
    pub fn with_codec_level(mut self, level: i32) -> Self {
        self.codec_level = level;
        self
    }

    /// Set the retention bound used by cleanup
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.is_empty() {
            return Err(Error::config("Storage key must not be empty"));
        }

        if let Err(err) = Url::parse(&self.link_base) {
            return Err(Error::config(format!(
                "Link base must be a valid URL: {}",
                err
            )));
        }

        if self.codec_level < 0 || self.codec_level > 9 {
            return Err(Error::config("Codec level must be between 0 and 9"));
        }

        if self.max_entries < 1 {
            return Err(Error::config("Max entries must be at least 1"));
        }

        Ok(())
    }

    /// Get the codec algorithm as a string
    pub fn codec_algorithm_str(&self) -> &'static str {
        self.codec_algorithm.name()
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Amber Configuration ===\n\n");

        result.push_str("Storage Configuration:\n");
        result.push_str(&format!("  Storage Key: {}\n", self.storage_key));

        result.push_str("\nLink Settings:\n");
        result.push_str(&format!("  Link Base: {}\n", self.link_base));
        result.push_str(&format!("  Codec Algorithm: {}\n", self.codec_algorithm));
        result.push_str(&format!("  Codec Level: {}\n", self.codec_level));

        result.push_str("\nRetention Policy:\n");
        result.push_str(&format!("  Max Entries: {}\n", self.max_entries));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShareConfig::default();

        // Check default values
        assert_eq!(config.storage_key, "amber.shares");
        assert_eq!(config.link_base, "http://localhost/");
        assert_eq!(config.codec_algorithm, CodecAlgorithm::Zstd);
        assert_eq!(config.codec_level, 3);
        assert_eq!(config.max_entries, 50);

        // Validate the default config
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ShareConfig::new()
            .with_storage_key("app.snapshots")
            .with_link_base("https://amber.example.com/view")
            .with_codec_algorithm(CodecAlgorithm::Lz4)
            .with_codec_level(6)
            .with_max_entries(200);

        // Check custom values
        assert_eq!(config.storage_key, "app.snapshots");
        assert_eq!(config.link_base, "https://amber.example.com/view");
        assert_eq!(config.codec_algorithm, CodecAlgorithm::Lz4);
        assert_eq!(config.codec_level, 6);
        assert_eq!(config.max_entries, 200);

        // Validate the custom config
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        // Test invalid values
        let invalid_configs = vec![
            ShareConfig::new().with_storage_key(""),
            ShareConfig::new().with_link_base("not a url"),
            ShareConfig::new().with_codec_level(-1),
            ShareConfig::new().with_codec_level(10),
            ShareConfig::new().with_max_entries(0),
        ];

        for config in invalid_configs {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_codec_algorithm() {
        // Test string conversion
        assert_eq!(CodecAlgorithm::None.to_string(), "none");
        assert_eq!(CodecAlgorithm::Lz4.to_string(), "lz4");
        assert_eq!(CodecAlgorithm::Zstd.to_string(), "zstd");

        // Test parsing
        assert_eq!(
            CodecAlgorithm::from_str("none").unwrap(),
            CodecAlgorithm::None
        );
        assert_eq!(
            CodecAlgorithm::from_str("LZ4").unwrap(),
            CodecAlgorithm::Lz4
        );
        assert_eq!(
            CodecAlgorithm::from_str("zstd").unwrap(),
            CodecAlgorithm::Zstd
        );
        assert!(CodecAlgorithm::from_str("invalid").is_err());

        // Test is_enabled
        assert!(!CodecAlgorithm::None.is_enabled());
        assert!(CodecAlgorithm::Lz4.is_enabled());
        assert!(CodecAlgorithm::Zstd.is_enabled());
    }

    #[test]
    fn test_config_pretty_string() {
        let config = ShareConfig::new();
        let pretty = config.to_string_pretty();

        assert!(pretty.contains("Storage Configuration:"));
        assert!(pretty.contains("Link Settings:"));
        assert!(pretty.contains("Retention Policy:"));
        assert!(pretty.contains(&format!("Codec Algorithm: {}", CodecAlgorithm::Zstd)));
    }
}
