//! Plotting infrastructure for comparative response-distribution charts
//!
//! This module renders the per-dataset frequency distributions for one
//! question as a single scatter chart using the [`plotters`] crate. Charts
//! are saved as PNG files with fixed 1000x800 resolution.

use crate::analysis::frequency::Distribution;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Anchor colors of the spectrum colormap, red through violet
const SPECTRUM_ANCHORS: [RGBColor; 6] = [
    RGBColor(255, 0, 0),     // red
    RGBColor(255, 165, 0),   // orange
    RGBColor(255, 255, 0),   // yellow
    RGBColor(0, 128, 0),     // green
    RGBColor(0, 0, 255),     // blue
    RGBColor(238, 130, 238), // violet
];

/// Number of interpolation steps across the spectrum
const SPECTRUM_STEPS: usize = 16;

/// Deterministic series color for the dataset at `position` in sorted order
///
/// Interpolates linearly between the six spectrum anchors across
/// [`SPECTRUM_STEPS`] steps. Positions beyond the last step clamp to violet,
/// so runs with many datasets still get a valid (if repeated) color.
pub fn spectrum_color(position: usize) -> RGBColor {
    let t = (position as f64 / (SPECTRUM_STEPS - 1) as f64).clamp(0.0, 1.0);
    let scaled = t * (SPECTRUM_ANCHORS.len() - 1) as f64;
    let segment = (scaled.floor() as usize).min(SPECTRUM_ANCHORS.len() - 2);
    let fraction = scaled - segment as f64;

    let lower = SPECTRUM_ANCHORS[segment];
    let upper = SPECTRUM_ANCHORS[segment + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * fraction).round() as u8;
    RGBColor(lerp(lower.0, upper.0), lerp(lower.1, upper.1), lerp(lower.2, upper.2))
}

/// Sorted union of response values across all distributions
///
/// Position in the returned vector is the x-axis slot of that response, so
/// differing response ranges per dataset align on a shared axis.
pub fn shared_axis(distributions: &BTreeMap<String, Distribution>) -> Vec<i64> {
    let union: std::collections::BTreeSet<i64> = distributions
        .values()
        .flat_map(|distribution| distribution.keys().copied())
        .collect();
    union.into_iter().collect()
}

/// Renders the per-dataset distributions as one scatter chart PNG
///
/// Datasets are drawn in ascending label order (the [`BTreeMap`] iteration
/// order) and colored by their position via [`spectrum_color`], which keeps
/// coloring reproducible across runs. X ticks show actual response values;
/// the y-axis carries the normalized frequencies.
///
/// # Headless Compatibility
/// Uses plotters' bitmap backend with default font rendering, so it works in
/// headless environments (Docker/CI) without system font dependencies.
pub fn plot_distributions(
    distributions: &BTreeMap<String, Distribution>,
    question_id: &str,
    output_path: &Path,
) -> Result<()> {
    let axis = shared_axis(distributions);

    let root = BitMapBackend::new(output_path, (1000, 800));
    let drawing_area = root.into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    // An empty aggregation still produces a valid (blank) chart artifact.
    if axis.is_empty() {
        drawing_area
            .present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        return Ok(());
    }

    let y_max = distributions
        .values()
        .flat_map(|distribution| distribution.values().copied())
        .fold(0.0f64, f64::max);
    let y_range = 0.0..(y_max * 1.15).max(0.05);

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(
            format!("Distribution of Responses for Question {question_id}"),
            ("sans-serif", 40),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(-1i32..axis.len() as i32, y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    // Ticks show the actual response values, not the normalized positions.
    let tick_labels = axis.clone();
    chart_context
        .configure_mesh()
        .x_desc("Response")
        .y_desc("Frequency")
        .x_labels(axis.len() + 2)
        .x_label_formatter(&move |position| {
            if *position >= 0 && (*position as usize) < tick_labels.len() {
                tick_labels[*position as usize].to_string()
            } else {
                String::new()
            }
        })
        .label_style(("sans-serif", 20))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (index, (label, distribution)) in distributions.iter().enumerate() {
        let color = spectrum_color(index);
        let points: Vec<(i32, f64)> = distribution
            .iter()
            .filter_map(|(response, frequency)| {
                // Every response is part of the union by construction.
                let position = axis.binary_search(response).ok()?;
                Some((position as i32, *frequency))
            })
            .collect();

        chart_context
            .draw_series(
                points
                    .into_iter()
                    .map(|point| Circle::new(point, 5, color.filled())),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(format!("Dataset {label}"))
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    chart_context
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
