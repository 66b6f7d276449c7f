//! Dataset loading and input discovery
//!
//! This module handles loading the per-year survey CSV files into in-memory
//! tables, enumerating the data directory, and reading the question-id list.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading input files
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

type Result<T> = core::result::Result<T, ParsingError>;

/// A single cell of a loaded dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A value that parsed as a number (includes NaN spellings like "nan")
    Number(f64),
    /// A non-empty value that did not parse as a number
    Text(String),
    /// An empty cell
    Missing,
}

/// One year's survey data, loaded into memory as a column-major table
///
/// Datasets are immutable once loaded and are identified downstream only by
/// their label, the source file's base name without extension.
#[derive(Debug)]
pub struct Dataset {
    label: String,
    headers: Vec<String>,
    columns: Vec<Vec<Field>>,
}

impl Dataset {
    /// The dataset label derived from the source file name
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Looks up a column by name, returning its cells top to bottom
    pub fn column(&self, name: &str) -> Option<&[Field]> {
        self.headers
            .iter()
            .position(|header| header == name)
            .map(|index| self.columns[index].as_slice())
    }
}

fn parse_field(raw: &str) -> Field {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Field::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => Field::Number(value),
        Err(_) => Field::Text(trimmed.to_string()),
    }
}

/// Derives a dataset label from a file path (base name without extension)
pub fn dataset_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Loads one dataset CSV into memory
///
/// Each call re-reads the file; there is no caching. Fails when the path does
/// not exist or the CSV is malformed (e.g. rows of differing width).
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut columns: Vec<Vec<Field>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (index, raw) in record.iter().enumerate() {
            columns[index].push(parse_field(raw));
        }
    }

    Ok(Dataset {
        label: dataset_label(path),
        headers,
        columns,
    })
}

/// Enumerates the dataset CSV files in a directory, sorted by file name
///
/// Only `.csv` files are returned. The resulting order defines the column
/// order of every downstream table, so sorting here keeps year columns
/// chronological for year-named files.
pub fn discover_datasets(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Reads the question-id list file: one column name per line, blanks skipped
pub fn read_question_ids(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
