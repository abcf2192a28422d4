use serde::{Deserialize, Serialize};

use crate::error::EditRejection;
use crate::interaction::InteractionMode;

/// Read-only state snapshot passed to observer hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverContext {
    pub span: usize,
    pub original_len: usize,
    pub extension: usize,
    pub dataset_version: u64,
    pub interaction_mode: InteractionMode,
}

/// Event stream exposed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    SourceSelected {
        label: String,
    },
    TransformChanged {
        kind: String,
    },
    TimelineExtended {
        previous_extension: usize,
        extension: usize,
    },
    PointEdited {
        series_index: usize,
        timestep: usize,
        value: f64,
    },
    EditRejected {
        series_index: usize,
        timestep: usize,
        reason: EditRejection,
    },
    /// A drag finished; the chart must be recomputed from the edited data.
    RecomputeRequested,
    DerivedRecomputed {
        len: usize,
        present: usize,
        dataset_version: u64,
    },
    ExpressionWarning {
        timestep: Option<usize>,
        message: String,
    },
}

/// Extension hook interface for host-side reactions (redraws, status bars,
/// warning panels).
pub trait ChartObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &ChartEvent, context: ObserverContext);
}
