use serde::{Deserialize, Serialize};

/// Raw series sample; `None` marks a period without a datum.
pub type SeriesValue = Option<f64>;

/// Labelled value column of a dataset.
///
/// Timestamps live on the owning dataset so every series shares one time
/// axis by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    label: String,
    values: Vec<SeriesValue>,
}

impl Series {
    #[must_use]
    pub fn new(label: impl Into<String>, values: Vec<SeriesValue>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn values(&self) -> &[SeriesValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn value_at(&self, timestep: usize) -> SeriesValue {
        self.values.get(timestep).copied().flatten()
    }

    /// Most recent present value, scanning backwards from the tail.
    #[must_use]
    pub fn last_present(&self) -> SeriesValue {
        self.values.iter().rev().find_map(|value| *value)
    }

    pub(crate) fn resize_carrying_forward(&mut self, len: usize) {
        if len <= self.values.len() {
            self.values.truncate(len);
            return;
        }
        let carried = self.last_present();
        self.values.resize(len, carried);
    }

    pub(crate) fn set_value(&mut self, timestep: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(timestep) {
            *slot = Some(value);
        }
    }
}

/// Drops non-finite samples so downstream math only sees real numbers.
#[must_use]
pub fn canonicalize_values(values: Vec<SeriesValue>) -> Vec<SeriesValue> {
    values
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()))
        .collect()
}
