// User settings
// Loaded from ~/.config/prtrack/settings.toml

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use prtrack_core::{AliasTable, LogicalField, ParseOptions, RemarkKeywords};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where to find the PR control file when none is given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// File used when no INPUT argument is given.
    pub default: Option<PathBuf>,
    /// Glob patterns tried in the working directory; newest match wins.
    pub search: Vec<String>,
    /// Worksheet to read from workbooks (first sheet when unset).
    pub sheet: Option<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            default: None,
            search: vec!["*PR*.csv".into(), "*PR*.xlsx".into()],
            sheet: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    /// WHATWG encoding labels, tried in order for delimited text.
    pub encodings: Vec<String>,
    /// Read `01/02/2024` as 1 February.
    pub day_first: bool,
    /// Drop rows without a PR number.
    pub drop_blank_pr: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        let opts = ParseOptions::default();
        Self {
            encodings: vec!["utf-8".into(), "windows-874".into(), "windows-1252".into()],
            day_first: opts.day_first,
            drop_blank_pr: opts.drop_blank_pr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub parse: ParseSettings,
    /// Extra column names per logical field key, tried before the built-ins.
    pub aliases: BTreeMap<String, Vec<String>>,
    pub remarks: RemarkKeywords,
}

impl Settings {
    /// Default settings file location.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prtrack")
            .join("settings.toml")
    }

    /// Load from the default location. A missing file means defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Load an explicitly named settings file. It must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.aliases.keys() {
            if LogicalField::from_key(key).is_none() {
                return Err(ConfigError::UnknownField(key.clone()));
            }
        }
        Ok(())
    }

    /// Built-in aliases with the user's additions in front.
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        let mut table = AliasTable::builtin();
        for (key, names) in &self.aliases {
            let field = LogicalField::from_key(key)
                .ok_or_else(|| ConfigError::UnknownField(key.clone()))?;
            let names = names.iter().map(|n| n.trim()).filter(|n| !n.is_empty());
            table = table.with_extra(field, names);
        }
        Ok(table)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            day_first: self.parse.day_first,
            drop_blank_pr: self.parse.drop_blank_pr,
        }
    }
}
