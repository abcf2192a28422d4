use tracing::debug;

use crate::core::{Dataset, SeriesRegistry, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::extensions::ChartObserver;
use crate::interaction::{InteractionMode, PointEditController};
use crate::transform::TransformSpec;

use super::validation::validate_chart_config;
use super::{ChartConfig, ChartEvent, DerivedOutput};

/// Main orchestration facade consumed by host applications.
///
/// `ScenarioChart` owns the dataset and coordinates timeline extension, the
/// active transform, cached derived output, and point-edit interaction.
/// Rendering stays with the host, which reads [`DerivedOutput`].
pub struct ScenarioChart {
    pub(super) dataset: Dataset,
    pub(super) config: ChartConfig,
    pub(super) source: String,
    pub(super) spec: TransformSpec,
    pub(super) editor: PointEditController,
    pub(super) cache: Option<DerivedOutput>,
    pub(super) observers: Vec<Box<dyn ChartObserver>>,
}

impl ScenarioChart {
    /// Creates a chart displaying `source` untransformed.
    pub fn new(dataset: Dataset, config: ChartConfig, source: &str) -> ChartResult<Self> {
        let config = validate_chart_config(config)?;
        if dataset.series_by_label(source).is_none() {
            return Err(ChartError::UnknownSeries(source.to_owned()));
        }
        debug!(source, span = dataset.len(), "create scenario chart");

        Ok(Self {
            dataset,
            config,
            source: source.to_owned(),
            spec: TransformSpec::Identity,
            editor: PointEditController::default(),
            cache: None,
            observers: Vec::new(),
        })
    }

    /// Loads the dataset from a host registry and creates the chart.
    pub fn from_registry<G: SeriesRegistry>(
        registry: &G,
        config: ChartConfig,
        source: &str,
    ) -> ChartResult<Self> {
        Self::new(Dataset::from_registry(registry)?, config, source)
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn config(&self) -> ChartConfig {
        self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        let config = validate_chart_config(ChartConfig {
            viewport,
            ..self.config
        })?;
        self.config = config;
        Ok(())
    }

    /// Replaces engine policies; cached output is discarded.
    pub fn set_config(&mut self, config: ChartConfig) -> ChartResult<()> {
        self.config = validate_chart_config(config)?;
        self.invalidate();
        Ok(())
    }

    /// Label of the series the active transform is applied to.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn select_source(&mut self, label: &str) -> ChartResult<()> {
        if self.dataset.series_by_label(label).is_none() {
            return Err(ChartError::UnknownSeries(label.to_owned()));
        }
        if self.source != label {
            self.source = label.to_owned();
            self.invalidate();
            self.emit_event(ChartEvent::SourceSelected {
                label: label.to_owned(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn transform_spec(&self) -> &TransformSpec {
        &self.spec
    }

    /// Sets the active transform after validating its parameters.
    pub fn set_transform(&mut self, spec: TransformSpec) -> ChartResult<()> {
        spec.validate()?;
        if self.spec != spec {
            debug!(kind = spec.kind_name(), "set transform");
            let kind = spec.kind_name().to_owned();
            self.spec = spec;
            self.invalidate();
            self.emit_event(ChartEvent::TransformChanged { kind });
        }
        Ok(())
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.editor.mode()
    }

    pub(super) fn invalidate(&mut self) {
        self.cache = None;
    }
}
