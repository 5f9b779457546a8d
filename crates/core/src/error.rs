use std::fmt;

use crate::schema::LogicalField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// A view needs a logical field that no physical column resolved to.
    FieldUnavailable {
        field: LogicalField,
        feature: &'static str,
        looked_for: Vec<String>,
    },
    /// Unrecognized status name (CLI/filter input).
    UnknownStatus(String),
    /// Unrecognized logical field key (alias overrides).
    UnknownField(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldUnavailable { field, feature, looked_for } => {
                write!(f, "{feature} unavailable: no {field} column found")?;
                if !looked_for.is_empty() {
                    write!(f, " (looked for: {})", looked_for.join(", "))?;
                }
                Ok(())
            }
            Self::UnknownStatus(s) => {
                write!(f, "unknown status '{s}' (expected pending, po_issued or received)")
            }
            Self::UnknownField(s) => write!(f, "unknown logical field '{s}'"),
        }
    }
}

impl std::error::Error for TrackError {}
