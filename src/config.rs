//! Configuration file support
//!
//! Loads settings from ~/.spangle.toml (or %USERPROFILE%\.spangle.toml on Windows)
//!
//! Example:
//! ```toml
//! [limits]
//! max_text_len = 1048576
//! max_spans = 100000
//!
//! [render]
//! format = "html"
//! class_prefix = "hl-"
//!
//! [theme]
//! "comment" = { fg = "bright_black", italic = true }
//!
//! [[languages]]
//! name = "c99"
//! extends = "c"
//! extensions = ["c99"]
//! rules = [ { name = "storage.modifier", pattern = '\brestrict\b' } ]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::render::RenderOptions;
use crate::syntax::{Limits, Registration, Registry, RuleDef, Style, Theme};

/// Configuration settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Work bounds per tokenization call
    pub limits: Limits,
    /// Output settings
    pub render: RenderOptions,
    /// Tag styles layered over the default theme
    pub theme: HashMap<String, Style>,
    /// Extra language tables, registered after the built-in ones
    pub languages: Vec<LanguageConfig>,
}

/// A language table defined in the configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageConfig {
    pub name: String,
    /// Language whose rules follow this one's
    #[serde(default)]
    pub extends: Option<String>,
    /// Leave an existing table with this name alone, parent and extensions included
    #[serde(default)]
    pub keep_existing: bool,
    /// File extensions, without the dot
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Rule entries, kept unparsed so one bad entry only drops itself
    #[serde(default)]
    pub rules: Vec<toml::Value>,
}

impl LanguageConfig {
    /// Parse each rule entry on its own; failures carry the parse message
    pub fn rule_entries(&self) -> impl Iterator<Item = std::result::Result<RuleDef, String>> + '_ {
        self.rules.iter().map(|value| {
            RuleDef::deserialize(value.clone())
                .map_err(|e| format!("invalid entry: {}", e.message()))
        })
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".spangle.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".spangle.toml"))
        }
    }

    /// Load configuration from the default path.
    ///
    /// A missing file gives defaults; an unreadable or invalid one is
    /// logged and also gives defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, path = %path.display(), "ignoring configuration file");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "loaded configuration");
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config.normalized())
    }

    /// Clamp values that would disable highlighting outright
    fn normalized(mut self) -> Self {
        self.limits.max_spans = self.limits.max_spans.max(1);
        self
    }

    /// Default theme with the configured entries applied
    pub fn theme(&self) -> Theme {
        Theme::default().with_overrides(&self.theme)
    }

    /// Register the configured languages, returning one report per language
    pub fn apply_languages(&self, registry: &mut Registry) -> Vec<Registration> {
        self.languages
            .iter()
            .map(|lang| {
                let registration =
                    registry.register_entries(&lang.name, lang.rule_entries(), lang.keep_existing);
                if registration.skipped {
                    debug!(language = %lang.name, "kept existing table, ignoring extends and extensions");
                    return registration;
                }
                if let Some(parent) = &lang.extends {
                    registry.extend(&lang.name, parent);
                }
                for ext in &lang.extensions {
                    registry.add_extension(ext, &lang.name);
                }
                registration
            })
            .collect()
    }
}
