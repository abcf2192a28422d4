use crate::core::MAX_TIMELINE_EXTENSION;
use crate::error::{ChartError, ChartResult};

use super::ChartConfig;

pub(super) fn validate_chart_config(config: ChartConfig) -> ChartResult<ChartConfig> {
    if !config.viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: config.viewport.width,
            height: config.viewport.height,
        });
    }
    if config.max_extension > MAX_TIMELINE_EXTENSION {
        return Err(ChartError::InvalidData(format!(
            "max_extension {} exceeds the limit of {MAX_TIMELINE_EXTENSION}",
            config.max_extension
        )));
    }
    Ok(config)
}

pub(super) fn validate_extension_request(
    delta_timesteps: i64,
    max_extension: usize,
) -> ChartResult<i64> {
    let within_limit = usize::try_from(delta_timesteps).map_or(true, |requested| {
        requested <= max_extension
    });
    if !within_limit {
        return Err(ChartError::InvalidData(format!(
            "extension of {delta_timesteps} timesteps exceeds the limit of {max_extension}"
        )));
    }
    Ok(delta_timesteps)
}
