use tracing::debug;

use crate::core::TimelineChange;
use crate::error::ChartResult;

use super::validation::validate_extension_request;
use super::{ChartEvent, ScenarioChart};

impl ScenarioChart {
    /// Sets the number of synthetic timesteps past the original span.
    ///
    /// Negative values clip to zero. An active drag is cancelled first since
    /// its target point may disappear.
    pub fn extend_timeline(&mut self, delta_timesteps: i64) -> ChartResult<TimelineChange> {
        let delta_timesteps =
            validate_extension_request(delta_timesteps, self.config.max_extension)?;
        if self.editor.drag_state().is_some() {
            debug!("cancelling point drag before timeline change");
            self.editor.on_drag_cancel();
        }

        let change = self.dataset.extend(delta_timesteps)?;
        if !change.is_noop() {
            self.invalidate();
            self.emit_event(ChartEvent::TimelineExtended {
                previous_extension: change.previous_extension,
                extension: change.extension,
            });
        }
        Ok(change)
    }

    #[must_use]
    pub fn extension(&self) -> usize {
        self.dataset.extension()
    }

    /// Current span: original length plus extension.
    #[must_use]
    pub fn span(&self) -> usize {
        self.dataset.len()
    }
}
