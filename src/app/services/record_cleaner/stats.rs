//! Cleaning statistics for one chunk or an accumulated run

use serde::{Deserialize, Serialize};

/// Rows removed or rewritten by each cleaning rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    /// Rows entering the cleaner
    pub input_rows: usize,
    /// Rows dropped for a missing cell
    pub missing_values: usize,
    /// Rows dropped for a 0.0 coordinate
    pub zero_coordinates: usize,
    /// Rows dropped for a duration outside (0, 86400]
    pub duration_outliers: usize,
    /// Ids rewritten with the "id" prefix
    pub ids_normalized: usize,
    /// Rows leaving the cleaner
    pub output_rows: usize,
}

impl CleaningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows removed by all rules
    pub fn dropped(&self) -> usize {
        self.missing_values + self.zero_coordinates + self.duration_outliers
    }

    /// Add another chunk's counts to this one
    pub fn merge(&mut self, other: &CleaningStats) {
        self.input_rows += other.input_rows;
        self.missing_values += other.missing_values;
        self.zero_coordinates += other.zero_coordinates;
        self.duration_outliers += other.duration_outliers;
        self.ids_normalized += other.ids_normalized;
        self.output_rows += other.output_rows;
    }

    /// Percentage of input rows that survived cleaning
    pub fn retention_rate(&self) -> f64 {
        if self.input_rows == 0 {
            100.0
        } else {
            (self.output_rows as f64 / self.input_rows as f64) * 100.0
        }
    }

    /// Get summary of cleaning statistics
    pub fn summary(&self) -> String {
        format!(
            "Cleaning Summary: {} -> {} rows ({:.1}% kept) | \
             Missing values: {} | Zero coordinates: {} | Duration outliers: {} | \
             Ids normalized: {}",
            self.input_rows,
            self.output_rows,
            self.retention_rate(),
            self.missing_values,
            self.zero_coordinates,
            self.duration_outliers,
            self.ids_normalized
        )
    }
}
