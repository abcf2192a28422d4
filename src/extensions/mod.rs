//! Host-facing hooks live here.
//!
//! Observers only see events and a read-only context; they never mutate the
//! dataset or transform state directly.

pub mod observers;

pub use observers::{ChartEvent, ChartObserver, ObserverContext};
