mod chart;
mod chart_config;
mod chart_snapshot;
mod derived;
mod observer_dispatch;
mod observer_registry;
mod point_edit_controller;
mod timeline_controller;
mod validation;

pub use chart::ScenarioChart;
pub use chart_config::{ChartConfig, DEFAULT_MAX_EXTENSION};
pub use chart_snapshot::{
    CHART_SNAPSHOT_JSON_SCHEMA_V1, ChartSnapshot, ChartSnapshotJsonContractV1, OverlayPoint,
};
pub use derived::{DerivedOutput, compute_derived_sequence, compute_many};

pub use crate::core::{InMemoryRegistry, RegistryEntry, RegistrySeries, SeriesRegistry};
pub use crate::extensions::{ChartEvent, ChartObserver, ObserverContext};
