use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Dataset, DisplayProjection, Viewport};
use crate::error::EditRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Dragging,
}

/// Point captured at drag start.
///
/// The projection is frozen for the whole gesture so successive writes do
/// not move the mapping under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub series_index: usize,
    pub timestep: usize,
    pub start_value: Option<f64>,
    pub start_pixel_y: Option<f64>,
    pub current_value: Option<f64>,
    pub projection: DisplayProjection,
    pub viewport: Viewport,
}

/// Edit produced by a completed drag; the host recomputes the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCommit {
    pub series_index: usize,
    pub timestep: usize,
    pub value: Option<f64>,
}

impl EditCommit {
    /// `true` when at least one value was written during the gesture.
    #[must_use]
    pub fn changed(self) -> bool {
        self.value.is_some()
    }
}

/// Drag state machine for extended-region points: `idle -> dragging -> idle`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointEditController {
    drag: Option<DragState>,
}

impl PointEditController {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        if self.drag.is_some() {
            InteractionMode::Dragging
        } else {
            InteractionMode::Idle
        }
    }

    #[must_use]
    pub fn drag_state(self) -> Option<DragState> {
        self.drag
    }

    /// Starts dragging `(series_index, timestep)`.
    ///
    /// Original-region points are display-only and cannot be grabbed.
    pub fn on_drag_start(
        &mut self,
        dataset: &Dataset,
        projection: DisplayProjection,
        viewport: Viewport,
        series_index: usize,
        timestep: usize,
    ) -> Result<DragState, EditRejection> {
        let series = dataset
            .get_series(series_index)
            .ok_or(EditRejection::UnknownSeries {
                index: series_index,
            })?;
        if timestep >= dataset.len() {
            return Err(EditRejection::OutOfRange {
                timestep,
                len: dataset.len(),
            });
        }
        if !dataset.is_extended_region(timestep) {
            return Err(EditRejection::OriginalRegion { timestep });
        }
        if projection.is_degenerate() {
            return Err(EditRejection::DegenerateProjection);
        }

        let start_value = series.value_at(timestep);
        let start_pixel_y =
            start_value.and_then(|value| projection.value_to_pixel(value, viewport).ok());
        let drag = DragState {
            series_index,
            timestep,
            start_value,
            start_pixel_y,
            current_value: None,
            projection,
            viewport,
        };
        self.drag = Some(drag);
        debug!(series_index, timestep, ?start_value, "point drag started");
        Ok(drag)
    }

    /// Inverse-projects the pointer and writes the value into the dataset.
    ///
    /// Returns `Ok(None)` when no drag is active.
    pub fn on_drag_move(
        &mut self,
        dataset: &mut Dataset,
        pointer_y: f64,
    ) -> Result<Option<f64>, EditRejection> {
        let Some(drag) = self.drag.as_mut() else {
            return Ok(None);
        };

        let value = drag
            .projection
            .pixel_to_value(pointer_y, drag.viewport)
            .map_err(|_| EditRejection::DegenerateProjection)?;
        dataset.apply_edit(drag.series_index, drag.timestep, value)?;
        drag.current_value = Some(value);
        trace!(
            series_index = drag.series_index,
            timestep = drag.timestep,
            pointer_y,
            value,
            "point dragged"
        );
        Ok(Some(value))
    }

    /// Ends the gesture and reports what was written.
    pub fn on_drag_release(&mut self) -> Option<EditCommit> {
        let drag = self.drag.take()?;
        debug!(
            series_index = drag.series_index,
            timestep = drag.timestep,
            value = ?drag.current_value,
            "point drag released"
        );
        Some(EditCommit {
            series_index: drag.series_index,
            timestep: drag.timestep,
            value: drag.current_value,
        })
    }

    /// Abandons the gesture; values already written stay in the dataset.
    pub fn on_drag_cancel(&mut self) {
        self.drag = None;
    }
}
