//! scenario-chart-rs: transform and timeline-extension engine for scenario
//! time-series charts.
//!
//! The crate owns the data side of an interactive chart: a dataset with an
//! original span and a synthetic extended span, six transform kinds (including
//! a sandboxed rule-expression language), a display projection, and a
//! point-edit controller for the extended region. Drawing is left to the host.

pub mod api;
pub mod core;
pub mod error;
pub mod expression;
pub mod extensions;
pub mod interaction;
pub mod telemetry;
pub mod transform;

pub use api::{ChartConfig, DerivedOutput, ScenarioChart};
pub use error::{ChartError, ChartResult, EditRejection};
