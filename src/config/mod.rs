//! Configuration management for `partial.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── log        # [log]
//! │   ├── response   # [response]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── handle     # Global config handle
//! └── mod.rs         # Config (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[response]` | Envelope encoding, content type, script guard  |
//! | `[serve]`    | Demo server (interface, port, page fixture)    |
//! | `[log]`      | Verbose diagnostics                            |

pub mod section;
pub mod types;

pub use section::{ContentTypeMode, LogConfig, ResponseConfig, ServeConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::log;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing partial.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ajax envelope settings
    #[serde(default)]
    pub response: ResponseConfig,

    /// Demo server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults; unknown fields are reported and
    /// ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            Self::from_path(path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML, collecting the paths of unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.response.encoding.trim().is_empty() {
            return Err(ConfigError::Validation(
                "response.encoding must not be empty".to_string(),
            ));
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation(
                "serve.port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a config snippet, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = Config::from_str("[response\nencoding = \"UTF-8\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.response.encoding, "UTF-8");
        assert!(config.response.guard);
        assert_eq!(config.serve.port, 5288);
        assert!(!config.log.verbose);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[response]\nencoding = \"UTF-8\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = Config::parse_with_ignored(content).unwrap();

        assert_eq!(config.response.encoding, "UTF-8");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_validation_rejects_empty_encoding() {
        let err = Config::from_str("[response]\nencoding = \"  \"").unwrap_err();
        assert!(err.to_string().contains("response.encoding"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("partial.toml")).unwrap();
        assert_eq!(config.serve.port, 5288);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            "[response]\ncontent_type = \"json\"\n\n[serve]\nport = 9000\n\n[log]\nverbose = true\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.response.content_type, ContentTypeMode::Json);
        assert_eq!(config.serve.port, 9000);
        assert!(config.log.verbose);
    }
}
