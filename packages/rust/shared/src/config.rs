//! Application configuration for Graphloom.
//!
//! User config lives at `~/.graphloom/graphloom.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GraphloomError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "graphloom.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".graphloom";

// ---------------------------------------------------------------------------
// Config structs (matching graphloom.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Source scanning policies.
    #[serde(default)]
    pub scan: ScanConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output directory (manifest + generated artifacts).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default import mode: "full" or "incremental".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Default persistence destination (libSQL database path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            mode: default_mode(),
            destination: None,
        }
    }
}

fn default_output_dir() -> String {
    "~/graphloom-out".into()
}
fn default_mode() -> String {
    "incremental".into()
}

/// `[scan]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File include patterns.
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// File exclude patterns.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_include_patterns() -> Vec<String> {
    vec!["**/*.md".into(), "**/*.feature".into()]
}

// ---------------------------------------------------------------------------
// Import options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Import mode: process everything, or only what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Process every discovered file; no removal handling.
    Full,
    /// Diff against the prior manifest and process only new/changed files.
    Incremental,
}

impl std::str::FromStr for ImportMode {
    type Err = GraphloomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(ImportMode::Full),
            "incremental" => Ok(ImportMode::Incremental),
            other => Err(GraphloomError::config(format!(
                "unknown import mode '{other}' (expected full or incremental)"
            ))),
        }
    }
}

/// Runtime import configuration, merged from config file + CLI flags.
///
/// The orchestrator's only public input.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Full or incremental import.
    pub mode: ImportMode,
    /// Root directory of the source document tree.
    pub source_dir: PathBuf,
    /// Output directory holding the import manifest.
    pub output_dir: PathBuf,
    /// Persistence destination. Required unless `dry_run`.
    pub destination: Option<PathBuf>,
    /// Compute everything, persist nothing.
    pub dry_run: bool,
    /// Skip relationship extraction entirely.
    pub skip_relationships: bool,
    /// Emit a provenance "source" node per processed file.
    pub generate_source_nodes: bool,
    /// Split documents into derived child nodes where supported.
    pub generate_derived_nodes: bool,
    /// Verbose progress output.
    pub verbose: bool,
    /// File include patterns.
    pub include_patterns: Vec<String>,
    /// File exclude patterns.
    pub exclude_patterns: Vec<String>,
}

impl ImportOptions {
    /// Build options for `source_dir` with config-file defaults applied.
    pub fn from_config(config: &AppConfig, source_dir: impl Into<PathBuf>) -> Self {
        let mode = config
            .defaults
            .mode
            .parse()
            .unwrap_or(ImportMode::Incremental);
        Self {
            mode,
            source_dir: source_dir.into(),
            output_dir: PathBuf::from(&config.defaults.output_dir),
            destination: config.defaults.destination.as_ref().map(PathBuf::from),
            dry_run: false,
            skip_relationships: false,
            generate_source_nodes: true,
            generate_derived_nodes: true,
            verbose: false,
            include_patterns: config.scan.include_patterns.clone(),
            exclude_patterns: config.scan.exclude_patterns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.graphloom/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GraphloomError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.graphloom/graphloom.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GraphloomError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GraphloomError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GraphloomError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GraphloomError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GraphloomError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("include_patterns"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.mode, "incremental");
        assert_eq!(parsed.scan.include_patterns.len(), 2);
    }

    #[test]
    fn config_with_overrides() {
        let toml_str = r#"
[defaults]
output_dir = "/tmp/graphloom"
mode = "full"
destination = "/tmp/graphloom/graph.db"

[scan]
exclude_patterns = ["**/drafts/**"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.mode, "full");
        assert_eq!(
            config.defaults.destination.as_deref(),
            Some("/tmp/graphloom/graph.db")
        );
        assert_eq!(config.scan.exclude_patterns, vec!["**/drafts/**"]);
    }

    #[test]
    fn import_options_from_config() {
        let mut config = AppConfig::default();
        config.defaults.mode = "full".into();
        let opts = ImportOptions::from_config(&config, "/docs");
        assert_eq!(opts.mode, ImportMode::Full);
        assert_eq!(opts.source_dir, PathBuf::from("/docs"));
        assert!(!opts.dry_run);
        assert!(opts.generate_source_nodes);
    }

    #[test]
    fn import_mode_parsing() {
        assert_eq!("full".parse::<ImportMode>().unwrap(), ImportMode::Full);
        assert!("partial".parse::<ImportMode>().is_err());
    }
}
