use super::series::SeriesValue;

/// Read access to one series owned by the host application.
pub trait RegistrySeries {
    fn label(&self) -> &str;
    fn all_times(&self) -> Vec<String>;
    fn all_values(&self) -> Vec<SeriesValue>;
}

/// Host-side storage the dataset is loaded from.
///
/// `interval` returns the raw period name; it is resolved to a
/// [`PeriodUnit`](super::PeriodUnit) only when the timeline needs to
/// synthesize new timestamps.
pub trait SeriesRegistry {
    type Series: RegistrySeries;

    fn series(&self) -> Vec<&Self::Series>;
    fn get_series(&self, index: usize) -> Option<&Self::Series>;
    fn interval(&self) -> String;
}

/// Owned registry entry used by [`InMemoryRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub label: String,
    pub times: Vec<String>,
    pub values: Vec<SeriesValue>,
}

impl RegistrySeries for RegistryEntry {
    fn label(&self) -> &str {
        &self.label
    }

    fn all_times(&self) -> Vec<String> {
        self.times.clone()
    }

    fn all_values(&self) -> Vec<SeriesValue> {
        self.values.clone()
    }
}

/// Simple registry for hosts without their own storage layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRegistry {
    interval: String,
    entries: Vec<RegistryEntry>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
            entries: Vec::new(),
        }
    }

    /// Adds a series sharing `times` with the registry's other entries.
    #[must_use]
    pub fn with_series(
        mut self,
        label: impl Into<String>,
        times: &[&str],
        values: Vec<SeriesValue>,
    ) -> Self {
        self.entries.push(RegistryEntry {
            label: label.into(),
            times: times.iter().map(|t| (*t).to_owned()).collect(),
            values,
        });
        self
    }
}

impl SeriesRegistry for InMemoryRegistry {
    type Series = RegistryEntry;

    fn series(&self) -> Vec<&RegistryEntry> {
        self.entries.iter().collect()
    }

    fn get_series(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    fn interval(&self) -> String {
        self.interval.clone()
    }
}
