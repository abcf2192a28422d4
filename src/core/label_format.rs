use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Magnitude above which extreme labels switch to scientific notation.
pub const SCIENTIFIC_THRESHOLD: f64 = 1e6;

/// Marker shown when an extreme label cannot be formatted.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Locale preset used by min/max label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LabelLocale {
    #[default]
    EnUs,
    EsEs,
}

impl LabelLocale {
    fn separators(self) -> (char, char) {
        match self {
            Self::EnUs => ('.', ','),
            Self::EsEs => (',', '.'),
        }
    }
}

/// Formats a min/max extreme for display.
///
/// Values whose magnitude exceeds [`SCIENTIFIC_THRESHOLD`] use scientific
/// notation; everything else uses one fixed decimal with locale grouping.
pub fn format_extreme_label(value: f64, locale: LabelLocale) -> ChartResult<String> {
    if !value.is_finite() {
        return Err(ChartError::InvalidData(
            "extreme label value must be finite".to_owned(),
        ));
    }

    let (decimal, _) = locale.separators();
    if value.abs() > SCIENTIFIC_THRESHOLD {
        let text = format!("{value:.2e}");
        return Ok(text.replace('.', &decimal.to_string()));
    }

    let text = format!("{value:.1}");
    let text = if text == "-0.0" { "0.0".to_owned() } else { text };
    Ok(group_fixed_decimal(&text, locale))
}

fn group_fixed_decimal(text: &str, locale: LabelLocale) -> String {
    let (decimal, group) = locale.separators();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(group);
        }
        grouped.push(ch);
    }

    let mut out = String::with_capacity(grouped.len() + fraction.len() + 2);
    out.push_str(sign);
    out.push_str(&grouped);
    if !fraction.is_empty() {
        out.push(decimal);
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_per_locale() {
        assert_eq!(
            format_extreme_label(1234567.0 / 10.0, LabelLocale::EnUs).expect("fmt"),
            "123,456.7"
        );
        assert_eq!(
            format_extreme_label(-98765.43, LabelLocale::EsEs).expect("fmt"),
            "-98.765,4"
        );
    }

    #[test]
    fn large_values_use_scientific_notation() {
        assert_eq!(
            format_extreme_label(2_500_000.0, LabelLocale::EnUs).expect("fmt"),
            "2.50e6"
        );
    }

    #[test]
    fn non_finite_values_fail() {
        assert!(format_extreme_label(f64::NAN, LabelLocale::EnUs).is_err());
    }
}
