use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::period::PeriodUnit;
use super::registry::{RegistrySeries, SeriesRegistry};
use super::series::{Series, SeriesValue, canonicalize_values};
use crate::error::{ChartError, ChartResult, EditRejection};

/// Time axis plus every series column, shared copy-on-write between the
/// dataset and its snapshots.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SeriesTable {
    pub(crate) times: Vec<String>,
    pub(crate) series: IndexMap<String, Series>,
}

/// Key of an edit-overlay entry: `(series index, timestep)`.
pub type OverlayKey = (usize, usize);

/// Collection of series sharing one time axis.
///
/// Invariants:
/// - every series has exactly `times.len()` entries
/// - labels are unique
/// - the first `original_len` entries are backed by recorded data
#[derive(Debug, Clone)]
pub struct Dataset {
    interval: String,
    original_len: usize,
    pub(super) table: Arc<SeriesTable>,
    pub(super) overlay: BTreeMap<OverlayKey, f64>,
    pub(super) version: u64,
}

impl Dataset {
    /// Builds a dataset from a shared time axis and labelled value columns.
    pub fn new(
        interval: impl Into<String>,
        times: Vec<String>,
        columns: Vec<(String, Vec<SeriesValue>)>,
    ) -> ChartResult<Self> {
        let interval = interval.into();
        let mut seen = HashSet::with_capacity(columns.len());
        let mut series = IndexMap::with_capacity(columns.len());

        for (label, values) in columns {
            if label.trim().is_empty() {
                return Err(ChartError::InvalidData(
                    "series label must not be empty".to_owned(),
                ));
            }
            if !seen.insert(label.clone()) {
                return Err(ChartError::InvalidData(format!(
                    "series label `{label}` is not unique"
                )));
            }
            if values.len() != times.len() {
                return Err(ChartError::InvalidData(format!(
                    "series `{label}` has {} values but the time axis has {}",
                    values.len(),
                    times.len()
                )));
            }
            let column = Series::new(label.clone(), canonicalize_values(values));
            series.insert(label, column);
        }

        debug!(
            interval = %interval,
            series_count = series.len(),
            span = times.len(),
            "load dataset"
        );

        Ok(Self {
            interval,
            original_len: times.len(),
            table: Arc::new(SeriesTable { times, series }),
            overlay: BTreeMap::new(),
            version: 0,
        })
    }

    /// Loads every series exposed by a host registry.
    ///
    /// The time axis is taken from the first series; all others must agree.
    pub fn from_registry<G: SeriesRegistry>(registry: &G) -> ChartResult<Self> {
        let entries = registry.series();
        let times = entries
            .first()
            .map(|entry| entry.all_times())
            .unwrap_or_default();

        let mut columns = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.all_times() != times {
                return Err(ChartError::InvalidData(format!(
                    "series `{}` does not share the dataset time axis",
                    entry.label()
                )));
            }
            columns.push((entry.label().to_owned(), entry.all_values()));
        }

        Self::new(registry.interval(), times, columns)
    }

    /// Raw interval name as supplied by the host.
    #[must_use]
    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Resolves the interval name into a known period unit.
    pub fn period(&self) -> ChartResult<PeriodUnit> {
        self.interval.parse()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Current span length (original plus extension).
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.times.is_empty()
    }

    /// Number of synthetic timesteps beyond the original span.
    #[must_use]
    pub fn extension(&self) -> usize {
        self.len().saturating_sub(self.original_len)
    }

    #[must_use]
    pub fn times(&self) -> &[String] {
        &self.table.times
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.table.series.len()
    }

    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.table.series.values()
    }

    #[must_use]
    pub fn get_series(&self, index: usize) -> Option<&Series> {
        self.table.series.get_index(index).map(|(_, series)| series)
    }

    #[must_use]
    pub fn series_by_label(&self, label: &str) -> Option<&Series> {
        self.table.series.get(label)
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.table.series.get_index_of(label)
    }

    /// Recorded point overrides in the extended region.
    #[must_use]
    pub fn edit_overlay(&self) -> &BTreeMap<OverlayKey, f64> {
        &self.overlay
    }

    /// Returns `true` when the point was overridden and no longer follows
    /// the carried-forward trend.
    #[must_use]
    pub fn is_diverging(&self, series_index: usize, timestep: usize) -> bool {
        self.overlay.contains_key(&(series_index, timestep))
    }

    #[must_use]
    pub fn is_extended_region(&self, timestep: usize) -> bool {
        timestep >= self.original_len && timestep < self.len()
    }

    /// Overwrites one extended-region sample and records it in the overlay.
    ///
    /// This is the only path that mutates series values.
    pub fn apply_edit(
        &mut self,
        series_index: usize,
        timestep: usize,
        value: f64,
    ) -> Result<(), EditRejection> {
        if !value.is_finite() {
            return Err(EditRejection::NonFiniteValue);
        }
        if series_index >= self.series_count() {
            return Err(EditRejection::UnknownSeries {
                index: series_index,
            });
        }
        let len = self.len();
        if timestep >= len {
            return Err(EditRejection::OutOfRange { timestep, len });
        }
        if timestep < self.original_len {
            warn!(series_index, timestep, "reject edit in original region");
            return Err(EditRejection::OriginalRegion { timestep });
        }

        let table = Arc::make_mut(&mut self.table);
        if let Some((_, series)) = table.series.get_index_mut(series_index) {
            series.set_value(timestep, value);
        }
        self.overlay.insert((series_index, timestep), value);
        self.version += 1;
        trace!(series_index, timestep, value, version = self.version, "apply point edit");
        Ok(())
    }

    /// Captures an immutable view for transform computation.
    #[must_use]
    pub fn snapshot(&self) -> DatasetSnapshot {
        DatasetSnapshot {
            version: self.version,
            original_len: self.original_len,
            table: Arc::clone(&self.table),
        }
    }
}

/// Read-only, versioned view of a dataset taken at the start of a
/// computation. Later extends or edits never tear an existing snapshot.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    version: u64,
    original_len: usize,
    table: Arc<SeriesTable>,
}

impl DatasetSnapshot {
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.times.is_empty()
    }

    #[must_use]
    pub fn times(&self) -> &[String] {
        &self.table.times
    }

    #[must_use]
    pub fn series_at(&self, index: usize) -> Option<&Series> {
        self.table.series.get_index(index).map(|(_, series)| series)
    }

    #[must_use]
    pub fn series_by_label(&self, label: &str) -> Option<&Series> {
        self.table.series.get(label)
    }

    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.table.series.values()
    }

    /// Looks up a series by label, failing with `UnknownSeries`.
    pub fn require(&self, label: &str) -> ChartResult<&Series> {
        self.series_by_label(label)
            .ok_or_else(|| ChartError::UnknownSeries(label.to_owned()))
    }
}
