mod analysis;
mod common;
mod parsing;
mod report;

use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;
use thiserror::Error;

/// Analyze survey response frequencies across yearly datasets
///
/// With `--question`, results are produced for that single question id.
/// Without it, every id in the question-id list file is processed.
#[derive(Parser, Debug)]
#[command(name = "analyze-survey-stats", version, about)]
struct Cli {
    /// Individual question id to get results for
    #[arg(long)]
    question: Option<String>,

    /// Directory containing the per-year dataset CSV files
    #[arg(long, default_value = "thesis_data")]
    data_dir: PathBuf,

    /// File listing one question id (column name) per line
    #[arg(long, default_value = "question_ids.txt")]
    question_ids: PathBuf,

    /// Directory where per-question artifacts are written
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

/// Errors that terminate the run
///
/// Per-dataset failures are isolated inside the aggregator and never reach
/// this level; what does reach it are configuration and environment errors
/// (missing question-id list, unwritable output directory), which are fatal.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("Report error: {0}")]
    Report(#[from] report::ReportError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let datasets = parsing::discover_datasets(&cli.data_dir)?;

    if let Some(question) = &cli.question {
        report::save_question_results(question, &datasets, &cli.output_dir)?;
    } else {
        let question_ids = parsing::read_question_ids(&cli.question_ids)?;
        let progress = ProgressBar::new(question_ids.len() as u64);
        for question in &question_ids {
            report::save_question_results(question, &datasets, &cli.output_dir)?;
            progress.inc(1);
        }
        progress.finish();
    }

    Ok(())
}
