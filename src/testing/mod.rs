//! Test fixtures
//!
//! Builds drop folders with real spreadsheet and JSON exports.

use crate::config::{Config, SourcesConfig};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Spreadsheet cell for fixtures
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    S(&'static str),
    N(f64),
    Blank,
}

/// Write `rows` to the first worksheet, starting at zero-based `start_row`
pub fn write_xlsx(path: &Path, start_row: u32, rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (start_row + r as u32, c as u16);
            match cell {
                Cell::S(s) => {
                    sheet.write_string(r, c, *s).unwrap();
                }
                Cell::N(n) => {
                    sheet.write_number(r, c, *n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save(path).unwrap();
}

/// The three fixed header rows of the exchange export
pub fn header() -> Vec<Vec<Cell>> {
    use Cell::S;
    vec![
        vec![S("DAM results")],
        vec![S("Delivery day 2024-01-01")],
        vec![S("Time"), S("Category"), S("Price"), S("Buy"), S("Volume")],
    ]
}

/// Temporary spreadsheet and JSON drop folders
pub struct Drops {
    pub root: TempDir,
    pub xlsx_dir: PathBuf,
    pub json_dir: PathBuf,
}

impl Drops {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let xlsx_dir = root.path().join("power-xlsx");
        let json_dir = root.path().join("power-json");
        fs::create_dir_all(&xlsx_dir).unwrap();
        fs::create_dir_all(&json_dir).unwrap();
        Self {
            root,
            xlsx_dir,
            json_dir,
        }
    }

    pub fn sources(&self) -> SourcesConfig {
        SourcesConfig {
            xlsx_dir: self.xlsx_dir.clone(),
            json_dir: self.json_dir.clone(),
            ..SourcesConfig::default()
        }
    }

    pub fn config(&self) -> Config {
        Config {
            sources: self.sources(),
            ..Config::default()
        }
    }

    /// Spreadsheet with the standard header followed by `rows`
    pub fn add_xlsx(&self, name: &str, rows: &[Vec<Cell>]) -> PathBuf {
        let path = self.xlsx_dir.join(name);
        let mut all = header();
        all.extend_from_slice(rows);
        write_xlsx(&path, 0, &all);
        path
    }

    pub fn add_json(&self, name: &str, body: &str) -> PathBuf {
        let path = self.json_dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    pub fn remove_xlsx_dir(&self) {
        fs::remove_dir_all(&self.xlsx_dir).unwrap();
    }
}
