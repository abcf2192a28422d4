//! Sandboxed rule-expression language.
//!
//! A rule such as `{GDP} / {*POP} + filter({!}, 0, 0.2)[i]` is parsed into an
//! [`Expr`] tree and evaluated once per timestep. Placeholders resolve into
//! the dataset's raw series:
//!
//! - `{label}` whole series, `{*label}` its value at the current timestep
//! - `{!}` / `{!*}` the same for the chart's selected source series
//!
//! Whole series broadcast element-wise against scalars. When a timestep's
//! result is still a whole series, its entry at that timestep is used.
//!
//! Rules longer than [`MAX_RULE_LEN`] bytes or nested deeper than
//! [`MAX_RULE_DEPTH`] levels are rejected at parse time.

pub mod ast;
pub mod filter;
pub mod interpreter;
pub mod parser;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::core::{DatasetSnapshot, SeriesValue};
use crate::error::ChartResult;

pub use ast::{BinaryOp, Expr, SeriesRef};
pub use filter::band_filter;
pub use interpreter::{Evaluator, Namespace};
pub use parser::{
    FILTER_IDENT, INDEX_IDENT, MAX_RULE_DEPTH, MAX_RULE_LEN, ParsedRule, parse_rule,
};

/// What an entry becomes when its rule evaluation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RuleFailurePolicy {
    /// Failed or undefined entries are absent.
    #[default]
    Absent,
    /// Failed or undefined entries are `0`, matching legacy output.
    Zero,
}

impl RuleFailurePolicy {
    fn degrade(self) -> SeriesValue {
        match self {
            Self::Absent => None,
            Self::Zero => Some(0.0),
        }
    }
}

/// Warning surfaced to the user instead of silently substituting values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionWarning {
    /// `None` when the whole rule is invalid.
    pub timestep: Option<usize>,
    pub message: String,
}

/// Result of evaluating a rule over the full span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub values: Vec<SeriesValue>,
    pub warnings: Vec<ExpressionWarning>,
}

impl RuleEvaluation {
    fn degraded(len: usize, policy: RuleFailurePolicy, message: String) -> Self {
        Self {
            values: vec![policy.degrade(); len],
            warnings: vec![ExpressionWarning {
                timestep: None,
                message,
            }],
        }
    }
}

/// Parsed rule ready for repeated evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExpression {
    source: String,
    ast: Expr,
    references: SmallVec<[SeriesRef; 4]>,
    filter_slots: usize,
}

impl RuleExpression {
    pub fn parse(text: &str) -> ChartResult<Self> {
        let parsed = parse_rule(text)?;
        Ok(Self {
            source: text.to_owned(),
            ast: parsed.ast,
            references: parsed.references,
            filter_slots: parsed.filter_slots,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Distinct series referenced by placeholders, in first-use order.
    #[must_use]
    pub fn references(&self) -> &[SeriesRef] {
        &self.references
    }

    /// Evaluates the rule at every timestep of the snapshot's span.
    ///
    /// Never fails: unresolvable references degrade the whole sequence and
    /// per-timestep failures degrade single entries, each with a warning.
    #[must_use]
    pub fn evaluate(
        &self,
        snapshot: &DatasetSnapshot,
        selected_label: &str,
        policy: RuleFailurePolicy,
    ) -> RuleEvaluation {
        let namespace = match Namespace::bind(snapshot, selected_label, &self.references) {
            Ok(namespace) => namespace,
            Err(err) => {
                warn!(rule = %self.source, error = %err, "rule references cannot be resolved");
                return RuleEvaluation::degraded(snapshot.len(), policy, err.to_string());
            }
        };

        let mut evaluator = Evaluator::new(&namespace, self.filter_slots);
        let mut values = Vec::with_capacity(namespace.len());
        let mut warnings = Vec::new();
        for timestep in 0..namespace.len() {
            match evaluator.evaluate_at(&self.ast, timestep) {
                Ok(Some(value)) => values.push(Some(value)),
                Ok(None) => values.push(policy.degrade()),
                Err(err) => {
                    values.push(policy.degrade());
                    warnings.push(ExpressionWarning {
                        timestep: Some(timestep),
                        message: err.to_string(),
                    });
                }
            }
        }

        if warnings.is_empty() {
            trace!(rule = %self.source, len = values.len(), "rule evaluated");
        } else {
            warn!(
                rule = %self.source,
                failed = warnings.len(),
                len = values.len(),
                "rule evaluation failed for some timesteps"
            );
        }
        RuleEvaluation { values, warnings }
    }
}

/// Parses and evaluates `text`, degrading instead of failing on a parse
/// error.
#[must_use]
pub fn evaluate_rule_text(
    text: &str,
    snapshot: &DatasetSnapshot,
    selected_label: &str,
    policy: RuleFailurePolicy,
) -> RuleEvaluation {
    match RuleExpression::parse(text) {
        Ok(rule) => rule.evaluate(snapshot, selected_label, policy),
        Err(err) => {
            warn!(rule = %text, error = %err, "rule expression is invalid");
            RuleEvaluation::degraded(snapshot.len(), policy, err.to_string())
        }
    }
}
