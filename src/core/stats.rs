//! Robust descriptive statistics over repeated benchmark samples.
//!
//! Quartiles are position-indexed on the sorted sample (no interpolation)
//! and the standard deviation uses a graduated small-sample correction.

use serde::{Deserialize, Serialize};

/// Summary of a finite sequence of samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub avg: f64,
    pub stddev: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::nan()
    }
}

impl Stats {
    /// All fields NaN, the summary of an empty sample
    pub fn nan() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            avg: f64::NAN,
            stddev: f64::NAN,
        }
    }

    /// Compute the summary of `values`.
    ///
    /// Sorting happens on a private copy; the caller's order is untouched.
    pub fn calculate(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::nan();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let min = sorted[0];
        let max = sorted[n - 1];

        // A deterministic solver repeats the exact same double; the general
        // formula could still report a rounding-level deviation.
        if min == max {
            return Self {
                min,
                max,
                q25: min,
                median: min,
                q75: min,
                avg: min,
                stddev: 0.0,
            };
        }

        let n4 = n / 4;
        let n2 = n / 2;

        let count = n as f64;
        let avg = sorted.iter().sum::<f64>() / count;
        let squared_deviation: f64 = sorted.iter().map(|v| (avg - v) * (avg - v)).sum();

        let divisor = if count > 1.5 {
            count - 1.5
        } else if count > 1.0 {
            count - 1.0
        } else {
            count
        };

        Self {
            min,
            max,
            q25: sorted[n4],
            median: sorted[n2],
            q75: sorted[n4 + n2],
            avg,
            stddev: (squared_deviation / divisor).sqrt(),
        }
    }
}

/// Growable sample that caches its summary once computed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Samples {
    values: Vec<f64>,
    stats: Stats,
}

impl Samples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[f64]) {
        self.values.extend_from_slice(values);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Recompute and cache the summary of the current values
    pub fn calculate(&mut self) -> &Stats {
        self.stats = Stats::calculate(&self.values);
        &self.stats
    }

    /// Summary as of the last `calculate` call (all NaN before that)
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl From<Vec<f64>> for Samples {
    fn from(values: Vec<f64>) -> Self {
        Self {
            values,
            stats: Stats::nan(),
        }
    }
}
