//! Source file resolution

use crate::config::SourcesConfig;
use crate::error::{Result, SeriesError};
use crate::types::SourceKind;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds the export file for a date in the configured drop folders
#[derive(Debug, Clone)]
pub struct SourceResolver {
    xlsx_dir: PathBuf,
    json_dir: PathBuf,
    xlsx_extension: String,
}

impl SourceResolver {
    pub fn new(config: &SourcesConfig) -> Self {
        Self {
            xlsx_dir: config.xlsx_dir.clone(),
            json_dir: config.json_dir.clone(),
            xlsx_extension: config.xlsx_extension.clone(),
        }
    }

    /// Drop folder for a source kind
    pub fn dir(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::Xlsx => &self.xlsx_dir,
            SourceKind::Json => &self.json_dir,
        }
    }

    /// Path of the file holding `date` for `kind`.
    ///
    /// Fails with `DirectoryMissing` when the drop folder does not exist and
    /// `FileNotFound` when it exists but holds nothing for the date.
    pub fn resolve(&self, date: NaiveDate, kind: SourceKind) -> Result<PathBuf> {
        let dir = self.dir(kind);
        if !dir.is_dir() {
            return Err(SeriesError::DirectoryMissing {
                kind,
                path: dir.to_path_buf(),
            });
        }

        let found = match kind {
            SourceKind::Xlsx => self.find_xlsx(dir, date),
            SourceKind::Json => find_json(dir, date),
        };

        match found {
            Some(path) => {
                debug!("Resolved {} source for {}: {}", kind, date, path.display());
                Ok(path)
            }
            None => Err(SeriesError::FileNotFound { kind, date }),
        }
    }

    /// Any file whose stem contains `YYYYMMDD`, else exactly `YYYY-MM-DD<ext>`
    fn find_xlsx(&self, dir: &Path, date: NaiveDate) -> Option<PathBuf> {
        let ymd = compact_date(date);
        let ext = self.xlsx_extension.as_str();

        let mut candidates: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .and_then(|name| name.strip_suffix(ext))
                        .is_some_and(|stem| stem.contains(&ymd))
                })
                .collect(),
            Err(e) => {
                warn!("Failed to list {}: {}", dir.display(), e);
                Vec::new()
            }
        };

        candidates.sort();
        if candidates.len() > 1 {
            debug!(
                "{} spreadsheet files match {}, using the first",
                candidates.len(),
                ymd
            );
        }
        if let Some(first) = candidates.into_iter().next() {
            return Some(first);
        }

        let explicit = dir.join(format!("{}{}", date.format("%Y-%m-%d"), ext));
        explicit.is_file().then_some(explicit)
    }
}

/// Exactly `YYYYMMDD.json`, no fuzzy matching
fn find_json(dir: &Path, date: NaiveDate) -> Option<PathBuf> {
    let file = dir.join(format!("{}.json", compact_date(date)));
    file.is_file().then_some(file)
}

/// `YYYYMMDD` form of a date
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
