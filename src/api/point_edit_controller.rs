use tracing::{debug, warn};

use crate::error::{ChartResult, EditRejection};
use crate::interaction::{DragState, EditCommit};

use super::{ChartEvent, ScenarioChart};

impl ScenarioChart {
    /// Overwrites one extended-region point.
    ///
    /// This is the only programmatic path that mutates series values.
    pub fn apply_point_edit(
        &mut self,
        series_index: usize,
        timestep: usize,
        value: f64,
    ) -> Result<(), EditRejection> {
        match self.dataset.apply_edit(series_index, timestep, value) {
            Ok(()) => {
                self.invalidate();
                self.emit_event(ChartEvent::PointEdited {
                    series_index,
                    timestep,
                    value,
                });
                Ok(())
            }
            Err(reason) => {
                self.reject_edit(series_index, timestep, reason);
                Err(reason)
            }
        }
    }

    /// Grabs a point for dragging, projected through the current derived
    /// output's display mapping.
    pub fn begin_point_drag(
        &mut self,
        series_index: usize,
        timestep: usize,
    ) -> ChartResult<DragState> {
        let projection = self.derived()?.projection;
        let viewport = self.config.viewport;
        match self
            .editor
            .on_drag_start(&self.dataset, projection, viewport, series_index, timestep)
        {
            Ok(drag) => Ok(drag),
            Err(reason) => {
                self.reject_edit(series_index, timestep, reason);
                Err(reason.into())
            }
        }
    }

    /// Moves the active drag to `pointer_y` and writes the inverse-projected
    /// value. Returns `Ok(None)` when nothing is being dragged.
    pub fn drag_point(&mut self, pointer_y: f64) -> ChartResult<Option<f64>> {
        let Some(drag) = self.editor.drag_state() else {
            return Ok(None);
        };
        match self.editor.on_drag_move(&mut self.dataset, pointer_y) {
            Ok(Some(value)) => {
                self.emit_event(ChartEvent::PointEdited {
                    series_index: drag.series_index,
                    timestep: drag.timestep,
                    value,
                });
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(reason) => {
                self.reject_edit(drag.series_index, drag.timestep, reason);
                Err(reason.into())
            }
        }
    }

    /// Finishes the drag and recomputes the chart from the edited data.
    pub fn release_point_drag(&mut self) -> ChartResult<Option<EditCommit>> {
        let Some(commit) = self.editor.on_drag_release() else {
            return Ok(None);
        };
        self.emit_event(ChartEvent::RecomputeRequested);
        self.recompute()?;
        Ok(Some(commit))
    }

    /// Abandons the drag. Values already written stay.
    pub fn cancel_point_drag(&mut self) {
        if self.editor.drag_state().is_some() {
            debug!("point drag cancelled");
            self.editor.on_drag_cancel();
        }
    }

    fn reject_edit(&mut self, series_index: usize, timestep: usize, reason: EditRejection) {
        warn!(series_index, timestep, %reason, "point edit rejected");
        self.emit_event(ChartEvent::EditRejected {
            series_index,
            timestep,
            reason,
        });
    }
}
