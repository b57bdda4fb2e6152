//! Configuration file support for Galley.
//!
//! Galley reads two configuration file locations:
//! - Global: `~/.galley/config.toml` - User-wide defaults
//! - Project: `.galley/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Profiles passed with
//! `--profile` are separate files carrying `[settings]` and `[options]`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Galley configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build tool settings
    pub build: BuildConfig,

    /// Default settings, as `key = "value"` (e.g., `"compiler.cppstd" = "20"`)
    pub settings: BTreeMap<String, String>,

    /// Consumption harness settings
    pub harness: HarnessSettings,

    /// Where declared dependencies are searched
    pub dependencies: DependenciesConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// CMake generator (e.g., "Ninja")
    pub generator: Option<String>,

    /// Default number of parallel jobs
    pub jobs: Option<usize>,

    /// Build directory root (default: `target/galley/build`)
    pub build_dir: Option<PathBuf>,

    /// Package directory root (default: `target/galley/package`)
    pub package_dir: Option<PathBuf>,
}

/// Harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Never build the consumption harness
    pub skip: bool,
}

/// Dependency search configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependenciesConfig {
    /// Install prefixes searched for declared dependencies
    pub prefixes: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.package_dir.is_some() {
            self.build.package_dir = other.build.package_dir;
        }

        self.settings.extend(other.settings);

        if other.harness.skip {
            self.harness.skip = true;
        }

        // Project prefixes are searched first
        if !other.dependencies.prefixes.is_empty() {
            let mut prefixes = other.dependencies.prefixes;
            prefixes.append(&mut self.dependencies.prefixes);
            self.dependencies.prefixes = prefixes;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.galley/config.toml)
/// 2. Global config (~/.galley/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));
    config
}

/// Get the global galley config directory (~/.galley).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".galley"))
}

/// Get the global config path (~/.galley/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.galley/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".galley").join("config.toml")
}

/// A settings/options profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Settings, as `key = "value"`
    pub settings: BTreeMap<String, String>,

    /// Option overrides; booleans or strings
    pub options: BTreeMap<String, toml::Value>,
}

impl Profile {
    /// Load a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// Option overrides as raw strings, ready for schema parsing.
    pub fn raw_options(&self) -> Result<Vec<(String, String)>> {
        self.options
            .iter()
            .map(|(name, value)| {
                let raw = match value {
                    toml::Value::Boolean(b) => b.to_string(),
                    toml::Value::String(s) => s.clone(),
                    other => anyhow::bail!(
                        "profile option `{}` must be a boolean or string, got {}",
                        name,
                        other.type_str()
                    ),
                };
                Ok((name.clone(), raw))
            })
            .collect()
    }
}
