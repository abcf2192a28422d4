pub mod dataset;
pub mod label_format;
pub mod period;
pub mod projection;
pub mod registry;
pub mod series;
pub mod timeline;
pub mod types;

pub use dataset::{Dataset, DatasetSnapshot, OverlayKey};
pub use label_format::{LabelLocale, SCIENTIFIC_THRESHOLD, UNKNOWN_LABEL, format_extreme_label};
pub use period::PeriodUnit;
pub use projection::{DisplayProjection, ProjectionLabels};
pub use registry::{InMemoryRegistry, RegistryEntry, RegistrySeries, SeriesRegistry};
pub use series::{Series, SeriesValue, canonicalize_values};
pub use timeline::{MAX_TIMELINE_EXTENSION, TimelineChange};
pub use types::Viewport;
