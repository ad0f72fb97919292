use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Parameter vector of a benchmark problem.
///
/// Thin wrapper over `Vec<f64>` so problems and solvers can share the
/// "fill with a constant, optionally resizing" idiom.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution(Vec<f64>);

impl Solution {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Solution of `len` copies of `value`
    pub fn constant(value: f64, len: usize) -> Self {
        Self(vec![value; len])
    }

    /// Overwrite every element with `value`, resizing first when `new_len` is given
    pub fn set_constant(&mut self, value: f64, new_len: Option<usize>) {
        if let Some(len) = new_len {
            self.0.resize(len, value);
        }
        self.0.iter_mut().for_each(|v| *v = value);
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for Solution {
    type Target = Vec<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Solution {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<f64>> for Solution {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for Solution {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}
