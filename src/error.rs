//! Error types for the series loader

use crate::types::SourceKind;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("{kind} directory not found: {}", path.display())]
    DirectoryMissing { kind: SourceKind, path: PathBuf },

    #[error("No {kind} file for {date}")]
    FileNotFound { kind: SourceKind, date: NaiveDate },

    #[error("Failed to parse {kind} file {file}: {reason}")]
    ParseFailure {
        kind: SourceKind,
        file: String,
        reason: String,
    },

    #[error("No usable rows in {kind} file {file}: {reason}")]
    NoUsableRows {
        kind: SourceKind,
        file: String,
        reason: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SeriesError {
    /// Only structural absence of a source lets `auto` mode try the next one.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            SeriesError::DirectoryMissing { .. } | SeriesError::FileNotFound { .. }
        )
    }

    /// HTTP-style status the transport layer may map this error to
    pub fn status_hint(&self) -> u16 {
        match self {
            SeriesError::FileNotFound { .. } => 404,
            SeriesError::InvalidRequest(_) => 400,
            _ => 500,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        use SourceKind::{Json, Xlsx};
        match self {
            SeriesError::DirectoryMissing { kind: Xlsx, .. } => "no_xlsx_dir",
            SeriesError::DirectoryMissing { kind: Json, .. } => "no_json_dir",
            SeriesError::FileNotFound { kind: Xlsx, .. } => "xlsx_no_file",
            SeriesError::FileNotFound { kind: Json, .. } => "json_no_file",
            SeriesError::ParseFailure { kind: Xlsx, .. } => "xlsx_error",
            SeriesError::ParseFailure { kind: Json, .. } => "json_error",
            SeriesError::NoUsableRows { kind: Xlsx, .. } => "xlsx_no_all_rows",
            SeriesError::NoUsableRows { kind: Json, .. } => "json_no_points",
            SeriesError::InvalidRequest(_) => "invalid_request",
            SeriesError::Internal(_) => "internal",
        }
    }

    /// Base name of the file involved, when one was found
    pub fn file(&self) -> Option<&str> {
        match self {
            SeriesError::ParseFailure { file, .. } | SeriesError::NoUsableRows { file, .. } => {
                Some(file.as_str())
            }
            _ => None,
        }
    }

    pub(crate) fn parse(kind: SourceKind, file: impl Into<String>, reason: impl ToString) -> Self {
        SeriesError::ParseFailure {
            kind,
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn no_rows(kind: SourceKind, file: impl Into<String>, reason: impl Into<String>) -> Self {
        SeriesError::NoUsableRows {
            kind,
            file: file.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
