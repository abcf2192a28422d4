use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::dataset::Dataset;
use crate::error::{ChartError, ChartResult};

/// Most synthetic timesteps a dataset accepts beyond its original span.
pub const MAX_TIMELINE_EXTENSION: usize = 100_000;

/// Outcome of a timeline extension request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineChange {
    pub previous_extension: usize,
    pub extension: usize,
    pub span: usize,
    pub version: u64,
}

impl TimelineChange {
    #[must_use]
    pub fn is_noop(self) -> bool {
        self.previous_extension == self.extension
    }
}

impl Dataset {
    /// Sets the number of synthetic timesteps beyond the original span.
    ///
    /// Negative requests clip to zero, restoring the original span. Growing
    /// the span carries each series' last present value forward and appends
    /// timestamps advanced from the last original timestamp. Shrinking
    /// truncates every series and drops overlay entries past the new end.
    /// Requests above [`MAX_TIMELINE_EXTENSION`] are rejected before any
    /// label is generated.
    pub fn extend(&mut self, delta_timesteps: i64) -> ChartResult<TimelineChange> {
        let previous_extension = self.extension();
        let target_extension = usize::try_from(delta_timesteps.max(0)).map_err(|_| {
            ChartError::InvalidData(format!(
                "extension of {delta_timesteps} timesteps does not fit the platform"
            ))
        })?;
        if target_extension > MAX_TIMELINE_EXTENSION {
            return Err(ChartError::InvalidData(format!(
                "extension of {target_extension} timesteps exceeds the limit of {MAX_TIMELINE_EXTENSION}"
            )));
        }

        if target_extension == previous_extension {
            trace!(extension = previous_extension, "timeline extend no-op");
            return Ok(self.timeline_change(previous_extension));
        }

        let target_len = self.original_len() + target_extension;
        if target_extension > previous_extension {
            self.grow_to(target_len)?;
        } else {
            self.truncate_to(target_len);
        }

        self.version += 1;
        debug!(
            previous_extension,
            extension = target_extension,
            span = target_len,
            version = self.version,
            "timeline extended"
        );
        Ok(self.timeline_change(previous_extension))
    }

    fn grow_to(&mut self, target_len: usize) -> ChartResult<()> {
        let period = self.period()?;
        let Some(anchor) = self.original_len().checked_sub(1).map(|i| &self.times()[i]) else {
            return Err(ChartError::InvalidData(
                "cannot extend a dataset without an original span".to_owned(),
            ));
        };

        // Labels are always counted from the last original timestamp.
        let synthetic: Vec<String> = period
            .labels_after(anchor, target_len - self.original_len())?
            .into_iter()
            .skip(self.extension())
            .collect();
        debug_assert_eq!(synthetic.len(), target_len - self.len());

        let table = Arc::make_mut(&mut self.table);
        table.times.extend(synthetic);
        for series in table.series.values_mut() {
            series.resize_carrying_forward(target_len);
        }
        Ok(())
    }

    fn truncate_to(&mut self, target_len: usize) {
        let table = Arc::make_mut(&mut self.table);
        table.times.truncate(target_len);
        for series in table.series.values_mut() {
            series.resize_carrying_forward(target_len);
        }
        self.overlay
            .retain(|&(_, timestep), _| timestep < target_len);
    }

    fn timeline_change(&self, previous_extension: usize) -> TimelineChange {
        TimelineChange {
            previous_extension,
            extension: self.extension(),
            span: self.len(),
            version: self.version,
        }
    }
}
