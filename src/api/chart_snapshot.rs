use serde::{Deserialize, Serialize};

use crate::core::Series;
use crate::error::{ChartError, ChartResult};
use crate::transform::TransformSpec;

use super::{DerivedOutput, ScenarioChart};

pub const CHART_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Overridden point recorded by an extended-region edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    pub series_index: usize,
    pub timestep: usize,
    pub value: f64,
}

/// Deterministic chart state for regression tests and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub interval: String,
    pub dataset_version: u64,
    pub original_len: usize,
    pub span: usize,
    pub times: Vec<String>,
    pub series: Vec<Series>,
    #[serde(default)]
    pub overlay: Vec<OverlayPoint>,
    pub source: String,
    pub spec: TransformSpec,
    pub derived: DerivedOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ChartSnapshot,
}

impl ChartSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartSnapshotJsonContractV1 {
            schema_version: CHART_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ChartSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ChartSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != CHART_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl ScenarioChart {
    /// Captures data, span and derived output, recomputing if stale.
    pub fn chart_snapshot(&mut self) -> ChartResult<ChartSnapshot> {
        let derived = self.derived()?.clone();
        let dataset = &self.dataset;
        let overlay = dataset
            .edit_overlay()
            .iter()
            .map(|(&(series_index, timestep), &value)| OverlayPoint {
                series_index,
                timestep,
                value,
            })
            .collect();

        Ok(ChartSnapshot {
            interval: dataset.interval().to_owned(),
            dataset_version: dataset.version(),
            original_len: dataset.original_len(),
            span: dataset.len(),
            times: dataset.times().to_vec(),
            series: dataset.series().cloned().collect(),
            overlay,
            source: self.source.clone(),
            spec: self.spec.clone(),
            derived,
        })
    }

    pub fn snapshot_json_contract_v1_pretty(&mut self) -> ChartResult<String> {
        self.chart_snapshot()?.to_json_contract_v1_pretty()
    }
}
