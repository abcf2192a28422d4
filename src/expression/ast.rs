use std::fmt;

use serde::{Deserialize, Serialize};

/// Series referenced from a placeholder token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesRef {
    /// `{label}` / `{*label}`.
    Named(String),
    /// `{!}` / `{!*}`: the chart's currently selected source series.
    Selected,
}

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(label) => write!(f, "{{{label}}}"),
            Self::Selected => f.write_str("{!}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl BinaryOp {
    pub(super) fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "^" => Self::Power,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::Less,
            "<=" => Self::LessOrEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterOrEqual,
            _ => return None,
        })
    }

    /// Applies the operator to two present operands.
    ///
    /// Comparisons yield `1` or `0`. Division by zero and non-finite results
    /// are undefined.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> Option<f64> {
        let truth = |flag: bool| if flag { 1.0 } else { 0.0 };
        let result = match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => {
                if right == 0.0 {
                    return None;
                }
                left / right
            }
            Self::Power => left.powf(right),
            Self::Equal => truth(left == right),
            Self::NotEqual => truth(left != right),
            Self::Less => truth(left < right),
            Self::LessOrEqual => truth(left <= right),
            Self::Greater => truth(left > right),
            Self::GreaterOrEqual => truth(left >= right),
        };
        result.is_finite().then_some(result)
    }
}

/// Parsed rule expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    /// Implicit loop variable `i`.
    Index,
    /// Whole-series reference.
    Series(SeriesRef),
    /// Series value at the current timestep.
    Step(SeriesRef),
    /// `filter(series, low, high)`; `slot` identifies the call for caching.
    Filter {
        slot: usize,
        series: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    Subscript {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Returns `true` when the value does not depend on the loop variable.
    #[must_use]
    pub fn is_step_invariant(&self) -> bool {
        match self {
            Self::Number(_) | Self::Series(_) => true,
            Self::Index | Self::Step(_) => false,
            Self::Filter {
                series, low, high, ..
            } => series.is_step_invariant() && low.is_step_invariant() && high.is_step_invariant(),
            Self::Subscript { target, index } => {
                target.is_step_invariant() && index.is_step_invariant()
            }
            Self::Negate(inner) => inner.is_step_invariant(),
            Self::Binary { left, right, .. } => {
                left.is_step_invariant() && right.is_step_invariant()
            }
        }
    }
}
