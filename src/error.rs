use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    #[error("no options found for key family: {0}")]
    EmptyFamily(String),

    #[error("missing key in scan record: {0}")]
    MissingKey(String),

    #[error("non-digit option for {prefix}: {value}")]
    InvalidDigits { prefix: String, value: String },

    #[error("option for {prefix} is not an integer: {value}")]
    InvalidNumber { prefix: String, value: String },

    #[error("malformed scan line: {0}")]
    MalformedLine(String),

    #[error("match data file not found: {0}")]
    StoreMissing(PathBuf),

    #[error("team list file not found: {0}")]
    RosterMissing(PathBuf),

    #[error("invalid team number on line {line}: {value}")]
    InvalidRoster { line: usize, value: String },

    #[error("header mismatch: file has [{expected}], row has [{found}]")]
    HeaderMismatch { expected: String, found: String },

    #[error("season schema has no {0} column; duplicate detection needs competition, match and team")]
    MissingKeyColumn(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl ScanError {
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            ScanError::EmptyFamily(_)
                | ScanError::MissingKey(_)
                | ScanError::InvalidDigits { .. }
                | ScanError::InvalidNumber { .. }
                | ScanError::MalformedLine(_)
        )
    }
}
