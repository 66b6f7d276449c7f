//! Per-question frequency analysis and cross-year aggregation
//!
//! This module computes the normalized response distribution of one survey
//! column within a dataset, and merges the distributions of every yearly
//! dataset into a unified frequency table.

use crate::common::FrequencyTable;
use crate::parsing::{load_dataset, Dataset, Field, ParsingError};
use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Normalized frequency of each integer response value within one dataset
///
/// Keys are unique and iterate in ascending order; values are proportions in
/// [0, 1] summing to 1 over the counted rows.
pub type Distribution = BTreeMap<i64, f64>;

/// Errors that can occur while analyzing one dataset for one question
///
/// All variants share the same isolation policy in the aggregator: the
/// affected dataset is skipped with a diagnostic, the pipeline continues.
#[derive(Error, Debug)]
pub enum FrequencyError {
    #[error("Question {question} is not a column of dataset {label}")]
    QuestionNotFound { question: String, label: String },

    #[error("Response {value} in column {question} cannot be coerced to an integer")]
    ResponseCoercion { question: String, value: String },

    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),
}

type Result<T> = core::result::Result<T, FrequencyError>;

/// Coerces one cell to an integer response key
///
/// Missing cells and NaN spellings coerce to 0; this conflates them with the
/// legitimate response 0, which is kept for compatibility with the historical
/// outputs. Other numbers truncate through float to integer. Text that does
/// not parse as a number is a per-dataset failure.
fn coerce_response(field: &Field, question_id: &str) -> Result<i64> {
    match field {
        Field::Missing => Ok(0),
        Field::Number(value) if value.is_nan() => Ok(0),
        Field::Number(value) if value.is_finite() => Ok(value.trunc() as i64),
        Field::Number(value) => Err(FrequencyError::ResponseCoercion {
            question: question_id.to_string(),
            value: value.to_string(),
        }),
        Field::Text(text) => Err(FrequencyError::ResponseCoercion {
            question: question_id.to_string(),
            value: text.clone(),
        }),
    }
}

/// Computes the normalized response distribution of one column
///
/// Value counts are normalized to proportions and keyed by the coerced
/// integer response, ascending. Side-effect free; fails when the question is
/// not a column of the dataset or a response cannot be coerced.
pub fn analyze_question(dataset: &Dataset, question_id: &str) -> Result<Distribution> {
    let column = dataset
        .column(question_id)
        .ok_or_else(|| FrequencyError::QuestionNotFound {
            question: question_id.to_string(),
            label: dataset.label().to_string(),
        })?;

    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for field in column {
        let key = coerce_response(field, question_id)?;
        *counts.entry(key).or_insert(0) += 1;
    }

    let total: u64 = counts.values().sum();
    Ok(counts
        .into_iter()
        .map(|(key, count)| (key, count as f64 / total as f64))
        .collect())
}

fn dataset_distribution(path: &Path, question_id: &str) -> Result<(String, Distribution)> {
    let dataset = load_dataset(path)?;
    let distribution = analyze_question(&dataset, question_id)?;
    Ok((dataset.label().to_string(), distribution))
}

/// Runs load + analyze over every dataset, keeping the survivors
///
/// Any per-dataset failure (unreadable file, missing column, bad response
/// value) logs a diagnostic and excludes that dataset; it never aborts the
/// remaining datasets. Surviving pairs preserve the input path order.
pub fn aggregate_distributions(
    question_id: &str,
    datasets: &[PathBuf],
) -> Vec<(String, Distribution)> {
    let mut pairs = Vec::new();
    for path in datasets {
        match dataset_distribution(path, question_id) {
            Ok(pair) => pairs.push(pair),
            Err(error) => warn!(
                "No question_id {question_id} was found for dataset {}: {error}",
                path.display()
            ),
        }
    }
    pairs
}

/// Aggregates one question across every dataset into a frequency table
///
/// Zero surviving datasets yield a well-formed empty table.
pub fn aggregate_frequencies(question_id: &str, datasets: &[PathBuf]) -> FrequencyTable {
    FrequencyTable::from_distributions(&aggregate_distributions(question_id, datasets))
}
