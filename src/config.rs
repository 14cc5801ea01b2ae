//! Configuration module for the matching system.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `JM_` and use double underscores
//! to separate nested levels:
//! - `JM_MATCH__SKILL_BOOST=0.1` sets `match.skill_boost`
//! - `JM_EMBEDDING__MODEL=BGEBaseENV15` sets `embedding.model`
//! - `JM_DEBUG=true` sets `debug`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide debug flag, set once from settings at startup.
static GLOBAL_DEBUG: AtomicBool = AtomicBool::new(false);

/// Check whether global debug output is enabled.
pub fn is_global_debug_enabled() -> bool {
    GLOBAL_DEBUG.load(Ordering::Relaxed)
}

/// Enable or disable global debug output for the process.
pub fn set_global_debug(enabled: bool) {
    GLOBAL_DEBUG.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding store snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Workspace root directory (where .jobmatch is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Embedding model settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Match scoring settings
    #[serde(default, rename = "match")]
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings. Must produce 768-dimensional vectors.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Directory where downloaded model files are cached
    #[serde(default = "default_model_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MatchingConfig {
    /// Score added per overlapping skill when ranking postings for a profile
    #[serde(default = "default_skill_boost")]
    pub skill_boost: f32,

    /// Number of matches returned when no limit is given
    #[serde(default = "default_match_limit")]
    pub default_limit: usize,
}

fn default_version() -> u32 {
    1
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".jobmatch/data")
}

fn default_false() -> bool {
    false
}

fn default_embedding_model() -> String {
    "GTEBaseENV15".to_string()
}

fn default_model_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("jobmatch/models")
}

fn default_skill_boost() -> f32 {
    0.05
}

fn default_match_limit() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            workspace_root: None,
            debug: false,
            embedding: EmbeddingConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            cache_dir: default_model_cache_dir(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            skill_boost: default_skill_boost(),
            default_limit: default_match_limit(),
        }
    }
}

impl Settings {
    /// Load settings from all available sources.
    ///
    /// Order of precedence (later overrides earlier):
    /// 1. Default values
    /// 2. `.jobmatch/settings.toml` in the workspace root
    /// 3. Environment variables prefixed with `JM_`
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".jobmatch/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; a single
            // underscore stays part of the field name
            .merge(
                Env::prefixed("JM_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load settings from a specific TOML file, still honoring `JM_`
    /// environment overrides.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("JM_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by looking for a .jobmatch directory,
    /// searching from the current directory up to root.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".jobmatch");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Find the workspace root (the directory containing .jobmatch).
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            if ancestor.join(".jobmatch").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Snapshot directory resolved against the workspace root when the
    /// configured path is relative.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        if self.data_dir.is_absolute() {
            return self.data_dir.clone();
        }
        match &self.workspace_root {
            Some(root) => root.join(&self.data_dir),
            None => self.data_dir.clone(),
        }
    }

    /// Create the default configuration file at `.jobmatch/settings.toml`.
    ///
    /// Returns an error if the file already exists, unless `force` is set.
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".jobmatch/settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let cache_dir = default_model_cache_dir();
        let template = format!(
            r#"# Jobmatch Configuration File

# Version of the configuration schema
version = 1

# Directory holding store snapshots (relative to workspace root)
data_dir = ".jobmatch/data"

# Global debug mode
debug = false

[embedding]
# Model to use for embeddings. Must produce 768-dimensional vectors.
# Supported: GTEBaseENV15, BGEBaseENV15, NomicEmbedTextV15, MultilingualE5Base
model = "GTEBaseENV15"

# Directory where downloaded model files are cached
cache_dir = "{}"

[match]
# Score added per overlapping skill when ranking postings for a profile
skill_boost = 0.05

# Number of matches returned when no limit is given
default_limit = 3
"#,
            cache_dir.display()
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.embedding.model, "GTEBaseENV15");
        assert_eq!(settings.matching.skill_boost, 0.05);
        assert_eq!(settings.matching.default_limit, 3);
        assert!(!settings.debug);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &config_path,
            r#"
debug = true

[embedding]
model = "BGEBaseENV15"

[match]
skill_boost = 0.1
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.embedding.model, "BGEBaseENV15");
        assert_eq!(settings.matching.skill_boost, 0.1);
        // Untouched fields keep their defaults
        assert_eq!(settings.matching.default_limit, 3);
    }

    #[test]
    fn test_env_override_with_nested_key() {
        // A distinct prefix keeps this test independent of real JM_ vars
        unsafe {
            std::env::set_var("JMTEST_MATCH__SKILL_BOOST", "0.2");
            std::env::set_var("JMTEST_EMBEDDING__MODEL", "NomicEmbedTextV15");
        }

        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(
                Env::prefixed("JMTEST_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .unwrap();

        assert_eq!(settings.matching.skill_boost, 0.2);
        assert_eq!(settings.embedding.model, "NomicEmbedTextV15");

        unsafe {
            std::env::remove_var("JMTEST_MATCH__SKILL_BOOST");
            std::env::remove_var("JMTEST_EMBEDDING__MODEL");
        }
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let settings = Settings::default();
        let toml = toml::to_string(&settings).unwrap();
        let restored: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(restored.embedding.model, settings.embedding.model);
        assert_eq!(restored.matching.skill_boost, settings.matching.skill_boost);
    }

    #[test]
    fn test_config_section_uses_match_name() {
        let settings = Settings::default();
        let toml = toml::to_string(&settings).unwrap();
        assert!(toml.contains("[match]"));
        assert!(!toml.contains("[matching]"));
    }
}
