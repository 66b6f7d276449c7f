//! Per-question artifact writer
//!
//! Runs the full pipeline for one question and persists its artifacts under
//! `<output_dir>/<question_id>/`: the frequency, percent-change, and
//! deviation tables as CSV, the outlier list as CSV, and the comparative
//! scatter plot as PNG. Existing artifacts are overwritten; there is no
//! versioning.

use crate::analysis::frequency::Distribution;
use crate::analysis::{aggregate_distributions, deviation, find_outliers, percent_change};
use crate::common::plots::plot_distributions;
use crate::common::{FrequencyTable, PlotError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::Table;
use thiserror::Error;

/// Errors that can occur while writing a question's artifacts
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create output directory: {0}")]
    OutputDir(std::io::Error),

    #[error("Failed to write CSV artifact: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to generate plot: {0}")]
    Plot(#[from] PlotError),
}

type Result<T> = core::result::Result<T, ReportError>;

fn write_outliers(
    outliers: &[crate::analysis::OutlierRecord],
    path: &Path,
) -> core::result::Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["Year", "Response", "Standard Deviation"])?;
    for record in outliers {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Runs the pipeline for one question and saves all five artifacts
///
/// The output directory for the question is created idempotently. Per-dataset
/// failures have already been isolated inside the aggregator, so an empty
/// aggregation still produces well-formed (empty) artifacts.
pub fn save_question_results(
    question_id: &str,
    datasets: &[PathBuf],
    output_dir: &Path,
) -> Result<()> {
    let question_dir = output_dir.join(question_id);
    fs::create_dir_all(&question_dir).map_err(ReportError::OutputDir)?;

    let pairs = aggregate_distributions(question_id, datasets);
    let frequencies = FrequencyTable::from_distributions(&pairs);
    println!("Frequency distribution for question {question_id}");
    println!("{}", frequencies.console_table());
    frequencies.write_csv(&question_dir.join(format!("{question_id}_response_frequency.csv")))?;

    let changes = percent_change(&frequencies);
    println!("Percent change between years per response for {question_id}");
    println!("{}", changes.console_table());
    changes.write_csv(&question_dir.join(format!("{question_id}_percent_change.csv")))?;

    let deviations = deviation(&changes);
    println!("Standard deviation of percent changes between responses per year for {question_id}");
    println!("{}", deviations.console_table());
    deviations.write_csv(&question_dir.join(format!("{question_id}_standard_deviation.csv")))?;

    let outliers = find_outliers(&deviations);
    println!("Outliers in change in response per year for {question_id}");
    if outliers.is_empty() {
        println!("No outliers detected");
    } else {
        println!("{}", Table::new(&outliers));
    }
    write_outliers(&outliers, &question_dir.join(format!("{question_id}_results.csv")))?;

    let by_label: BTreeMap<String, Distribution> = pairs.into_iter().collect();
    plot_distributions(
        &by_label,
        question_id,
        &question_dir.join(format!("{question_id}.png")),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_csv_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_save_question_results_empty_aggregation() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results");

        // No dataset carries Q1: everything is skipped, artifacts still appear.
        let dataset = write_csv_file(dir.path(), "2020.csv", "Q2\n1\n");
        save_question_results("Q1", &[dataset], &output).unwrap();

        let question_dir = output.join("Q1");
        assert!(question_dir.join("Q1_response_frequency.csv").exists());
        assert!(question_dir.join("Q1_percent_change.csv").exists());
        assert!(question_dir.join("Q1_standard_deviation.csv").exists());
        assert!(question_dir.join("Q1_results.csv").exists());
        assert!(question_dir.join("Q1.png").exists());
    }

    #[test]
    fn test_outliers_csv_header_always_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_outliers(&[], &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "Year,Response,Standard Deviation");
    }

    #[test]
    fn test_outliers_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let outliers = vec![crate::analysis::OutlierRecord {
            dataset: "2021".to_string(),
            response: 3,
            deviation: 2.5,
        }];
        write_outliers(&outliers, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "Year,Response,Standard Deviation");
        assert_eq!(lines.next().unwrap(), "2021,3,2.5");
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_save_question_results_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results");

        let a = write_csv_file(dir.path(), "2020.csv", "Q1\n1\n1\n2\n2\n2\n");
        let b = write_csv_file(dir.path(), "2021.csv", "Q1\n1\n1\n1\n2\n2\n");
        save_question_results("Q1", &[a, b], &output).unwrap();

        let question_dir = output.join("Q1");
        let frequencies =
            fs::read_to_string(question_dir.join("Q1_response_frequency.csv")).unwrap();
        assert!(frequencies.starts_with(",2020,2021"));
        assert!(question_dir.join("Q1.png").exists());

        // Re-running overwrites the artifacts without error.
        save_question_results("Q1", &[], &output).unwrap();
    }
}
