//! Build configuration module.
//!
//! Handles loading, validating, and merging `develweb.toml`. The files hold
//! the defaults a project wants on every run, so the command line can stay
//! short. Config files cascade from the working directory down to the
//! directory of the root page file, each overriding the one above:
//!
//! ```text
//! ./
//! ├── develweb.toml            # Project-wide defaults
//! └── site/
//!     ├── develweb.toml        # Overrides for pages in site/
//!     ├── index.page
//!     └── lang/
//!         └── cs.lang
//! ```
//!
//! A page directory outside the working directory (absolute, or reached
//! through `..`) only uses its own `develweb.toml`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [build]
//! collapse = false          # Bundle scripts and styles (-c)
//! phony = false             # Phony rules in the dependency file (-p)
//! # charset = "utf-8"       # <meta charset> when the page sets none
//!
//! [language]
//! # file = "lang/cs.lang"       # Translation table (-l)
//! # missing = "lang/todo.lang"  # Missing-key export (-g)
//! ```
//!
//! Paths are relative to the directory holding the `develweb.toml` that sets
//! them. Command-line options win over every file. Unknown keys are rejected to catch typos early.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name looked up in every directory of the cascade.
pub const CONFIG_FILE: &str = "develweb.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `develweb.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Output options.
    pub build: BuildOptions,
    /// Translation table and missing-key export.
    pub language: LanguageOptions,
}

/// Output options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Collapse scripts and styles into one bundle each.
    pub collapse: bool,
    /// Add an empty rule per prerequisite to the dependency file.
    pub phony: bool,
    /// Charset used when the page has no `!charset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
}

/// Language file locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageOptions {
    /// Translation table to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Where to export keys that have no translation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<PathBuf>,
}

impl BuildConfig {
    /// Validate option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .build
            .charset
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "build.charset must not be blank".into(),
            ));
        }
        if let (Some(file), Some(missing)) = (&self.language.file, &self.language.missing)
            && file == missing
        {
            return Err(ConfigError::Validation(
                "language.missing must not overwrite language.file".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BuildConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `develweb.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Directories whose config applies to pages in `dir`, outermost first.
///
/// Every directory from `root` down to `dir` is a layer. A `dir` that is not
/// below `root` is its own only layer.
pub fn config_dirs(root: &Path, dir: &Path) -> Vec<PathBuf> {
    let dir = paths::normalize(dir);
    let below = match dir.strip_prefix(root) {
        Ok(below) if below.components().all(|c| matches!(c, Component::Normal(_))) => below,
        _ => return vec![dir.clone()],
    };
    let mut dirs = vec![root.to_path_buf()];
    let mut current = root.to_path_buf();
    for part in below.components() {
        current.push(part);
        dirs.push(current.clone());
    }
    dirs
}

/// Resolve `[language]` paths of one config file against its directory.
fn rebase_language_paths(mut raw: toml::Value, dir: &Path) -> toml::Value {
    if let Some(language) = raw.get_mut("language").and_then(toml::Value::as_table_mut) {
        for key in ["file", "missing"] {
            if let Some(toml::Value::String(path)) = language.get_mut(key) {
                let rebased = paths::resolve(dir, path.as_str());
                *path = rebased.to_string_lossy().into_owned();
            }
        }
    }
    raw
}

/// Load the cascade of config files from `root` down to `dir`.
///
/// Each file is merged over the layers above it, starting from stock
/// defaults. Unknown keys in any layer are rejected; the merged result is
/// validated.
pub fn load_config_cascade(root: &Path, dir: &Path) -> Result<BuildConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    for layer in config_dirs(root, dir) {
        if let Some(raw) = load_raw_config(&layer)? {
            merged = merge_toml(merged, rebase_language_paths(raw, &layer));
        }
    }
    resolve_config(merged, None)
}

/// Load the config for pages in `dir`, cascading from the working directory.
pub fn load_config(dir: &Path) -> Result<BuildConfig, ConfigError> {
    load_config_cascade(Path::new(""), dir)
}

/// Returns a fully-commented stock `develweb.toml`.
///
/// Printed by `develweb --gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# develweb configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to the .page file it applies to, or in a parent
# directory to share it. Files closer to the page override files further up.
# Paths are relative to this file. Command-line options override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[build]
# Collapse all scripts into one .js bundle and all styles into one .css
# bundle instead of linking every module (same as -c).
collapse = false

# Add an empty rule for every prerequisite in the dependency file, so that
# removing a module does not break make (same as -p).
phony = false

# Charset for <meta charset> when the page has no !charset directive.
# charset = "utf-8"

# ---------------------------------------------------------------------------
# Localization
# ---------------------------------------------------------------------------
[language]
# Translation table: one "namespace","text","translation" row per line
# (same as -l).
# file = "lang/cs.lang"

# Export {{keys}} that have no translation, ready to be filled in (same as -g).
# missing = "lang/todo.lang"
"##
}

// =============================================================================
// Tests
// =============================================================================
