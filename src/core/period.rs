use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Sampling period shared by every series of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl PeriodUnit {
    /// Canonical name used by series registries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Daily => "daily",
        }
    }

    /// Parses a timestamp label written in this unit's canonical truncation.
    ///
    /// Yearly labels are `YYYY`, monthly labels `YYYY-MM`, weekly and daily
    /// labels `YYYY-MM-DD`.
    pub fn parse_label(self, label: &str) -> ChartResult<NaiveDate> {
        let label = label.trim();
        let parsed = match self {
            Self::Yearly => label
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
            Self::Monthly => NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d").ok(),
            Self::Weekly | Self::Daily => NaiveDate::parse_from_str(label, "%Y-%m-%d").ok(),
        };
        parsed.ok_or_else(|| {
            ChartError::InvalidData(format!(
                "timestamp `{label}` is not a valid {} label",
                self.as_str()
            ))
        })
    }

    /// Formats a date using this unit's canonical truncation.
    #[must_use]
    pub fn format_label(self, date: NaiveDate) -> String {
        match self {
            Self::Yearly => format!("{:04}", date.year()),
            Self::Monthly => date.format("%Y-%m").to_string(),
            Self::Weekly | Self::Daily => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Advances `date` by `steps` periods.
    pub fn advance(self, date: NaiveDate, steps: u32) -> ChartResult<NaiveDate> {
        let advanced = match self {
            Self::Yearly => date.checked_add_months(Months::new(steps.saturating_mul(12))),
            Self::Monthly => date.checked_add_months(Months::new(steps)),
            Self::Weekly => date.checked_add_days(Days::new(u64::from(steps) * 7)),
            Self::Daily => date.checked_add_days(Days::new(u64::from(steps))),
        };
        advanced.ok_or_else(|| {
            ChartError::InvalidData(format!(
                "cannot advance {date} by {steps} {} periods",
                self.as_str()
            ))
        })
    }

    /// Generates `count` labels following `last_label`.
    pub fn labels_after(self, last_label: &str, count: usize) -> ChartResult<Vec<String>> {
        let anchor = self.parse_label(last_label)?;
        (1..=count)
            .map(|step| {
                let step = u32::try_from(step).map_err(|_| {
                    ChartError::InvalidData("extension length exceeds u32".to_owned())
                })?;
                self.advance(anchor, step).map(|date| self.format_label(date))
            })
            .collect()
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodUnit {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yearly" | "annual" | "a" | "y" => Ok(Self::Yearly),
            "monthly" | "m" => Ok(Self::Monthly),
            "weekly" | "w" => Ok(Self::Weekly),
            "daily" | "d" => Ok(Self::Daily),
            other => Err(ChartError::UnsupportedPeriodUnit(other.to_owned())),
        }
    }
}
