use std::fmt;

use crate::model::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, duplicate mapping, etc.).
    ConfigValidation(String),
    /// A required column is absent from a source's header row.
    MissingColumn { source: Source, column: String },
    /// Source has zero data rows. Only raised for the master register.
    EmptyInput { source: Source },
    /// IO error (file read, layer lookup, worker failure, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column '{column}'")
            }
            Self::EmptyInput { source } => write!(f, "{source}: no data rows"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
