//! Optional `crucible.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [output]
//! format = "json"
//!
//! [document]
//! recover = true
//! max_errors = 10
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::OutputFormat;

/// Looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "crucible.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputSettings,
    pub document: DocumentSettings,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub format: Option<OutputFormat>,
}

/// `[document]` section: how multi-line input is handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentSettings {
    /// Keep going past lines that fail to parse.
    pub recover: bool,
    /// Stop recovering after this many failures.
    pub max_errors: usize,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            recover: false,
            max_errors: crucible_core::DEFAULT_MAX_ERRORS,
        }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Load the explicit config file, else `crucible.toml` in the working
/// directory if one exists, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using config from working directory");
                read_config(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(
            r#"
[output]
format = "json"

[document]
recover = true
max_errors = 3
"#,
        )
        .unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(config.document.recover);
        assert_eq!(config.document.max_errors, 3);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.document.max_errors, crucible_core::DEFAULT_MAX_ERRORS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("[output]\ncolour = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/crucible.toml"))).unwrap_err();
        assert!(err.contains("could not read"));
    }
}
