use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file exists but could not be read.
    Read { path: PathBuf, reason: String },
    /// TOML syntax or type error.
    Parse { path: PathBuf, reason: String },
    /// `[aliases]` key that names no logical field.
    UnknownField(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "cannot read settings {}: {reason}", path.display())
            }
            Self::Parse { path, reason } => {
                write!(f, "invalid settings {}: {reason}", path.display())
            }
            Self::UnknownField(key) => write!(f, "unknown field in [aliases]: '{key}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
