//! Year-over-year change and outlier detection
//!
//! Derives the percent-change table between adjacent dataset columns of a
//! frequency table, normalizes the absolute changes into deviation scores
//! against a single global mean and sample standard deviation, and flags the
//! cells that exceed the two-sigma threshold.

use crate::common::{FrequencyTable, MetricTable};
use serde::Serialize;
use tabled::Tabled;

/// Deviation magnitude above which a cell counts as an outlier (two-sigma
/// rule). Comparison is strict: exactly 2.0 is not an outlier.
pub const OUTLIER_THRESHOLD: f64 = 2.0;

/// One flagged (dataset, response) cell with its deviation score
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct OutlierRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub dataset: String,

    #[serde(rename = "Response")]
    #[tabled(rename = "Response")]
    pub response: i64,

    #[serde(rename = "Standard Deviation")]
    #[tabled(rename = "Standard Deviation")]
    pub deviation: f64,
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Column-wise percent change between adjacent dataset columns
///
/// Cell (r, c) is `100 * (freq(r, c) - freq(r, prev)) / freq(r, prev)`,
/// rounded to 2 decimal places. The first column has no predecessor and is
/// dropped. A zero previous frequency makes the cell undefined; it is never
/// fabricated as 0 or infinity. Fewer than 2 columns yield an empty table.
pub fn percent_change(frequencies: &FrequencyTable) -> MetricTable {
    let responses = frequencies.responses().to_vec();
    let columns = frequencies.labels().len();
    if columns < 2 {
        let cells = vec![Vec::new(); responses.len()];
        return MetricTable::new(responses, Vec::new(), cells);
    }

    let labels = frequencies.labels()[1..].to_vec();
    let cells = (0..responses.len())
        .map(|row| {
            (1..columns)
                .map(|column| {
                    let previous = frequencies.get(row, column - 1);
                    let current = frequencies.get(row, column);
                    if previous == 0.0 {
                        None
                    } else {
                        Some(round_two((current - previous) / previous * 100.0))
                    }
                })
                .collect()
        })
        .collect();

    MetricTable::new(responses, labels, cells)
}

/// Normalizes absolute percent changes into global z-scores
///
/// The mean and sample (n-1) standard deviation are taken once over all
/// defined absolute values of the whole table, not per row or column. Each
/// defined cell maps to `(|v| - mean) / std_dev`; undefined cells stay
/// undefined. With fewer than 2 defined cells the sample standard deviation
/// does not exist, and with a zero standard deviation the score would divide
/// by zero; both cases yield an entirely undefined table.
pub fn deviation(percent_changes: &MetricTable) -> MetricTable {
    let magnitudes: Vec<f64> = percent_changes
        .defined_cells()
        .map(|(_, _, value)| value.abs())
        .collect();

    if magnitudes.len() < 2 {
        return percent_changes.map_defined(|_| None);
    }

    let count = magnitudes.len() as f64;
    let mean = magnitudes.iter().sum::<f64>() / count;
    let variance = magnitudes
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (count - 1.0);
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return percent_changes.map_defined(|_| None);
    }

    percent_changes.map_defined(|value| Some((value.abs() - mean) / std_dev))
}

/// Collects outlier records in row-major order over the deviation table
///
/// A cell qualifies iff it is defined and its magnitude strictly exceeds
/// [`OUTLIER_THRESHOLD`].
pub fn find_outliers(deviations: &MetricTable) -> Vec<OutlierRecord> {
    deviations
        .defined_cells()
        .filter(|(_, _, value)| value.abs() > OUTLIER_THRESHOLD)
        .map(|(row, column, value)| OutlierRecord {
            dataset: deviations.labels()[column].clone(),
            response: deviations.responses()[row],
            deviation: value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::frequency::Distribution;

    fn distribution(entries: &[(i64, f64)]) -> Distribution {
        entries.iter().copied().collect()
    }

    fn two_year_table() -> FrequencyTable {
        FrequencyTable::from_distributions(&[
            ("2020".to_string(), distribution(&[(1, 0.4), (2, 0.6)])),
            ("2021".to_string(), distribution(&[(1, 0.6), (2, 0.4)])),
        ])
    }

    #[test]
    fn test_percent_change_example() {
        let changes = percent_change(&two_year_table());

        assert_eq!(changes.labels(), &["2021".to_string()]);
        assert_eq!(changes.get(0, 0), Some(50.0));
        assert_eq!(changes.get(1, 0), Some(-33.33));
    }

    #[test]
    fn test_percent_change_single_column_is_empty() {
        let table = FrequencyTable::from_distributions(&[(
            "2020".to_string(),
            distribution(&[(1, 1.0)]),
        )]);
        let changes = percent_change(&table);

        assert!(changes.labels().is_empty());
        assert_eq!(changes.responses(), &[1]);
    }

    #[test]
    fn test_percent_change_zero_previous_is_undefined() {
        let table = FrequencyTable::from_distributions(&[
            ("2020".to_string(), distribution(&[(1, 1.0)])),
            ("2021".to_string(), distribution(&[(1, 0.5), (2, 0.5)])),
        ]);
        let changes = percent_change(&table);

        // Response 2 had frequency 0.0 in 2020
        assert_eq!(changes.get(1, 0), None);
        assert_eq!(changes.get(0, 0), Some(-50.0));
    }

    #[test]
    fn test_percent_change_idempotent() {
        let table = two_year_table();
        assert_eq!(percent_change(&table), percent_change(&table));
    }

    #[test]
    fn test_deviation_known_values() {
        let changes = MetricTable::new(
            vec![1, 2, 3],
            vec!["2021".to_string()],
            vec![vec![Some(10.0)], vec![Some(-30.0)], vec![Some(50.0)]],
        );
        let scores = deviation(&changes);

        // |values| = [10, 30, 50], mean 30, sample std dev 20
        assert_eq!(scores.get(0, 0), Some(-1.0));
        assert_eq!(scores.get(1, 0), Some(0.0));
        assert_eq!(scores.get(2, 0), Some(1.0));
    }

    #[test]
    fn test_deviation_preserves_undefined_cells() {
        let changes = MetricTable::new(
            vec![1, 2, 3],
            vec!["2021".to_string()],
            vec![vec![Some(10.0)], vec![None], vec![Some(50.0)]],
        );
        let scores = deviation(&changes);

        assert_eq!(scores.get(1, 0), None);
        assert!(scores.get(0, 0).is_some());
        assert!(scores.get(2, 0).is_some());
    }

    #[test]
    fn test_deviation_single_defined_cell_is_all_undefined() {
        let changes = MetricTable::new(
            vec![1, 2],
            vec!["2021".to_string()],
            vec![vec![Some(42.0)], vec![None]],
        );
        let scores = deviation(&changes);

        assert_eq!(scores.get(0, 0), None);
        assert_eq!(scores.get(1, 0), None);
        assert!(find_outliers(&scores).is_empty());
    }

    #[test]
    fn test_deviation_zero_spread_is_all_undefined() {
        let changes = MetricTable::new(
            vec![1, 2],
            vec!["2021".to_string()],
            vec![vec![Some(25.0)], vec![Some(-25.0)]],
        );
        let scores = deviation(&changes);

        assert_eq!(scores.get(0, 0), None);
        assert_eq!(scores.get(1, 0), None);
    }

    #[test]
    fn test_deviation_idempotent() {
        let changes = percent_change(&two_year_table());
        assert_eq!(deviation(&changes), deviation(&changes));
    }

    #[test]
    fn test_outlier_threshold_is_strict() {
        let scores = MetricTable::new(
            vec![1, 2],
            vec!["2021".to_string()],
            vec![vec![Some(2.0)], vec![Some(2.0001)]],
        );
        let outliers = find_outliers(&scores);

        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].response, 2);
        assert_eq!(outliers[0].deviation, 2.0001);
    }

    #[test]
    fn test_outliers_include_negative_scores() {
        let scores = MetricTable::new(
            vec![1],
            vec!["2021".to_string()],
            vec![vec![Some(-2.5)]],
        );
        let outliers = find_outliers(&scores);
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].deviation, -2.5);
    }

    #[test]
    fn test_outliers_row_major_order() {
        let scores = MetricTable::new(
            vec![1, 2],
            vec!["2021".to_string(), "2022".to_string()],
            vec![
                vec![Some(3.0), Some(-3.0)],
                vec![Some(2.5), None],
            ],
        );
        let outliers = find_outliers(&scores);

        let order: Vec<(String, i64)> = outliers
            .iter()
            .map(|record| (record.dataset.clone(), record.response))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2021".to_string(), 1),
                ("2022".to_string(), 1),
                ("2021".to_string(), 2),
            ]
        );
    }
}
