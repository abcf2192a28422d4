use serde::{Deserialize, Serialize};

use crate::core::{LabelLocale, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::expression::RuleFailurePolicy;
use crate::transform::{LagMode, TransformOptions};

pub const DEFAULT_MAX_EXTENSION: usize = 1_000;

/// Public chart bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub label_locale: LabelLocale,
    #[serde(default)]
    pub rule_failure_policy: RuleFailurePolicy,
    #[serde(default)]
    pub lag_mode: LagMode,
    #[serde(default = "default_max_extension")]
    pub max_extension: usize,
}

impl ChartConfig {
    /// Creates a config with default policies for the given plot size.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            label_locale: LabelLocale::default(),
            rule_failure_policy: RuleFailurePolicy::default(),
            lag_mode: LagMode::default(),
            max_extension: default_max_extension(),
        }
    }

    #[must_use]
    pub fn with_label_locale(mut self, locale: LabelLocale) -> Self {
        self.label_locale = locale;
        self
    }

    /// Sets what failed rule-expression entries become.
    #[must_use]
    pub fn with_rule_failure_policy(mut self, policy: RuleFailurePolicy) -> Self {
        self.rule_failure_policy = policy;
        self
    }

    /// Sets whether the lag-shift transform actually shifts values.
    #[must_use]
    pub fn with_lag_mode(mut self, mode: LagMode) -> Self {
        self.lag_mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_extension(mut self, max_extension: usize) -> Self {
        self.max_extension = max_extension;
        self
    }

    #[must_use]
    pub fn transform_options(self) -> TransformOptions {
        TransformOptions {
            rule_failure_policy: self.rule_failure_policy,
            lag_mode: self.lag_mode,
        }
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_max_extension() -> usize {
    DEFAULT_MAX_EXTENSION
}
