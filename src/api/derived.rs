use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DatasetSnapshot, DisplayProjection, ProjectionLabels, SeriesValue};
use crate::error::{ChartError, ChartResult};
use crate::transform::{DerivedSequence, TransformSpec, compute_derived};

use super::{ChartConfig, ChartEvent, ScenarioChart};

/// Everything a host needs to draw the active series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedOutput {
    pub spec: TransformSpec,
    pub source: String,
    pub sequence: DerivedSequence,
    pub projection: DisplayProjection,
    pub labels: ProjectionLabels,
    /// Derived values mapped into `[0, 1]`.
    pub projected: Vec<SeriesValue>,
}

impl DerivedOutput {
    #[must_use]
    pub fn dataset_version(&self) -> u64 {
        self.sequence.snapshot_version
    }
}

/// Runs the transform and fits the display projection to its output.
pub fn compute_derived_sequence(
    spec: &TransformSpec,
    snapshot: &DatasetSnapshot,
    source: &str,
    config: ChartConfig,
) -> ChartResult<DerivedOutput> {
    let sequence = compute_derived(spec, snapshot, source, config.transform_options())?;
    let mut projection = DisplayProjection::from_values(&sequence.values);
    let labels = projection.format_labels(config.label_locale);
    let projected = projection.project_sequence(&sequence.values);

    Ok(DerivedOutput {
        spec: spec.clone(),
        source: source.to_owned(),
        sequence,
        projection,
        labels,
        projected,
    })
}

/// Evaluates independent specs against one snapshot.
///
/// Results keep the order of `specs`.
#[cfg(feature = "parallel-recompute")]
pub fn compute_many(
    specs: &[TransformSpec],
    snapshot: &DatasetSnapshot,
    source: &str,
    config: ChartConfig,
) -> Vec<ChartResult<DerivedOutput>> {
    use rayon::prelude::*;

    specs
        .par_iter()
        .map(|spec| compute_derived_sequence(spec, snapshot, source, config))
        .collect()
}

/// Evaluates independent specs against one snapshot.
///
/// Results keep the order of `specs`.
#[cfg(not(feature = "parallel-recompute"))]
pub fn compute_many(
    specs: &[TransformSpec],
    snapshot: &DatasetSnapshot,
    source: &str,
    config: ChartConfig,
) -> Vec<ChartResult<DerivedOutput>> {
    specs
        .iter()
        .map(|spec| compute_derived_sequence(spec, snapshot, source, config))
        .collect()
}

impl ScenarioChart {
    /// Returns the derived output, recomputing only when the dataset version,
    /// transform or source changed since the last computation.
    pub fn derived(&mut self) -> ChartResult<&DerivedOutput> {
        let fresh = self.cache.as_ref().is_some_and(|cached| {
            cached.dataset_version() == self.dataset.version()
                && cached.spec == self.spec
                && cached.source == self.source
        });
        if !fresh {
            self.recompute()?;
        }
        self.cache
            .as_ref()
            .ok_or_else(|| ChartError::InvalidData("derived output is unavailable".to_owned()))
    }

    /// Last computed output without triggering a recompute.
    #[must_use]
    pub fn cached_derived(&self) -> Option<&DerivedOutput> {
        self.cache.as_ref()
    }

    /// Unconditionally recomputes the derived output from a fresh snapshot.
    pub fn recompute(&mut self) -> ChartResult<&DerivedOutput> {
        let snapshot = self.dataset.snapshot();
        let output = compute_derived_sequence(&self.spec, &snapshot, &self.source, self.config)?;
        debug!(
            kind = self.spec.kind_name(),
            source = %self.source,
            dataset_version = snapshot.version(),
            "chart recomputed"
        );

        for warning in &output.sequence.warnings {
            self.emit_event(ChartEvent::ExpressionWarning {
                timestep: warning.timestep,
                message: warning.message.clone(),
            });
        }
        self.emit_event(ChartEvent::DerivedRecomputed {
            len: output.sequence.len(),
            present: output.sequence.present_count(),
            dataset_version: output.dataset_version(),
        });
        Ok(&*self.cache.insert(output))
    }

    /// Fits a projection for every spec in `specs` over the current data.
    pub fn preview_many(&self, specs: &[TransformSpec]) -> Vec<ChartResult<DerivedOutput>> {
        compute_many(specs, &self.dataset.snapshot(), &self.source, self.config)
    }
}
