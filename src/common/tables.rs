//! Tabular structures shared across analysis phases
//!
//! Two table shapes flow through the pipeline:
//! - [`FrequencyTable`]: fully defined cells, one frequency per
//!   (response, dataset) pair
//! - [`MetricTable`]: derived metrics where a cell may be undefined
//!   (e.g. percent change over a zero previous frequency)
//!
//! Both render to CSV artifacts and to ASCII tables via the [`tabled`] crate.

use crate::analysis::frequency::Distribution;
use std::collections::BTreeSet;
use std::path::Path;
use tabled::builder::Builder;

/// Frequencies per response value (rows) and dataset label (columns)
///
/// Rows are sorted ascending by response value; columns keep the order the
/// datasets were supplied in. Every cell is defined: responses unobserved in
/// a dataset hold exactly 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    responses: Vec<i64>,
    labels: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl FrequencyTable {
    /// Builds the unified table from per-dataset distributions
    ///
    /// The row index is the union of all observed response values, sorted
    /// ascending. Pairs keep their input order as column order.
    pub fn from_distributions(pairs: &[(String, Distribution)]) -> Self {
        let union: BTreeSet<i64> = pairs
            .iter()
            .flat_map(|(_, distribution)| distribution.keys().copied())
            .collect();
        let responses: Vec<i64> = union.into_iter().collect();
        let labels: Vec<String> = pairs.iter().map(|(label, _)| label.clone()).collect();

        let cells = responses
            .iter()
            .map(|response| {
                pairs
                    .iter()
                    .map(|(_, distribution)| distribution.get(response).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Self {
            responses,
            labels,
            cells,
        }
    }

    pub fn responses(&self) -> &[i64] {
        &self.responses
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Cell at (row, column); rows index responses, columns index labels
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.cells[row][column]
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty() || self.labels.is_empty()
    }

    /// Writes the table as a CSV artifact, row-indexed by response value
    pub fn write_csv(&self, path: &Path) -> core::result::Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(index_header(&self.labels))?;
        for (row, response) in self.responses.iter().enumerate() {
            let mut record = vec![response.to_string()];
            record.extend(self.cells[row].iter().map(|value| value.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Formats the table for console output
    pub fn console_table(&self) -> String {
        render_console(&self.labels, &self.responses, |row, column| {
            self.cells[row][column].to_string()
        })
    }
}

/// A derived metric per response value and dataset label, cells optional
///
/// `None` marks an undefined cell (division by zero, or a deviation score
/// with no usable sample). Undefined cells stay undefined through every
/// downstream transformation and serialize as empty CSV fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    responses: Vec<i64>,
    labels: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl MetricTable {
    /// Assembles a table from row-major cells
    ///
    /// Every row must have exactly one cell per label.
    pub fn new(responses: Vec<i64>, labels: Vec<String>, cells: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert_eq!(responses.len(), cells.len());
        debug_assert!(cells.iter().all(|row| row.len() == labels.len()));
        Self {
            responses,
            labels,
            cells,
        }
    }

    pub fn responses(&self) -> &[i64] {
        &self.responses
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells[row][column]
    }

    /// Iterates defined cells row-major as (row, column, value)
    pub fn defined_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, columns)| {
            columns
                .iter()
                .enumerate()
                .filter_map(move |(column, cell)| cell.map(|value| (row, column, value)))
        })
    }

    /// Maps every defined cell through `transform`, keeping undefined cells
    pub fn map_defined(&self, transform: impl Fn(f64) -> Option<f64>) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.and_then(&transform))
                    .collect()
            })
            .collect();
        Self {
            responses: self.responses.clone(),
            labels: self.labels.clone(),
            cells,
        }
    }

    /// Writes the table as a CSV artifact; undefined cells become empty fields
    pub fn write_csv(&self, path: &Path) -> core::result::Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(index_header(&self.labels))?;
        for (row, response) in self.responses.iter().enumerate() {
            let mut record = vec![response.to_string()];
            record.extend(self.cells[row].iter().map(format_optional));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Formats the table for console output; undefined cells render blank
    pub fn console_table(&self) -> String {
        render_console(&self.labels, &self.responses, |row, column| {
            format_optional(&self.cells[row][column])
        })
    }
}

fn format_optional(cell: &Option<f64>) -> String {
    match cell {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

fn index_header(labels: &[String]) -> Vec<String> {
    let mut header = vec![String::new()];
    header.extend(labels.iter().cloned());
    header
}

fn render_console(
    labels: &[String],
    responses: &[i64],
    cell: impl Fn(usize, usize) -> String,
) -> String {
    if responses.is_empty() || labels.is_empty() {
        return "No data available".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(index_header(labels));
    for (row, response) in responses.iter().enumerate() {
        let mut record = vec![response.to_string()];
        record.extend((0..labels.len()).map(|column| cell(row, column)));
        builder.push_record(record);
    }
    builder.build().to_string()
}
