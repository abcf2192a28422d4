//! Converts rule text into an [`Expr`] tree using the pest grammar in
//! `rule.pest`.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use smallvec::SmallVec;

use super::ast::{BinaryOp, Expr, SeriesRef};
use crate::error::{ChartError, ChartResult};

#[derive(Parser)]
#[grammar = "expression/rule.pest"]
struct RuleParser;

/// Name of the implicit loop variable.
pub const INDEX_IDENT: &str = "i";
/// Name of the frequency-filter function.
pub const FILTER_IDENT: &str = "filter";
/// Longest accepted rule text, in bytes.
pub const MAX_RULE_LEN: usize = 16 * 1024;
/// Deepest accepted expression tree, also the bound on bracket nesting and
/// on `^` operators.
pub const MAX_RULE_DEPTH: usize = 256;

/// Output of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRule {
    pub ast: Expr,
    pub references: SmallVec<[SeriesRef; 4]>,
    pub filter_slots: usize,
}

pub fn parse_rule(text: &str) -> ChartResult<ParsedRule> {
    check_bounds(text)?;
    let mut pairs = RuleParser::parse(Rule::rule_expr, text)
        .map_err(|e| ChartError::InvalidExpression(format!("parse error: {e}")))?;
    let root = pairs
        .next()
        .ok_or_else(|| invalid("empty parse result".to_owned()))?;
    let expr = root
        .into_inner()
        .next()
        .ok_or_else(|| invalid("no expression found".to_owned()))?;

    let mut builder = AstBuilder::default();
    let built = builder.build(expr)?;
    Ok(ParsedRule {
        ast: built.expr,
        references: builder.references,
        filter_slots: builder.filter_slots,
    })
}

fn invalid(message: String) -> ChartError {
    ChartError::InvalidExpression(message)
}

fn too_deep() -> ChartError {
    invalid(format!("rule nests deeper than {MAX_RULE_DEPTH} levels"))
}

/// Rejects text whose size or nesting would make the recursive descent
/// parser or the evaluator exhaust the stack.
fn check_bounds(text: &str) -> ChartResult<()> {
    if text.len() > MAX_RULE_LEN {
        return Err(invalid(format!(
            "rule text is {} bytes, limit is {MAX_RULE_LEN}",
            text.len()
        )));
    }

    let mut nesting = 0usize;
    let mut exponents = 0usize;
    let mut in_label = false;
    for ch in text.chars() {
        match ch {
            '{' if !in_label => in_label = true,
            '}' if in_label => in_label = false,
            _ if in_label => {}
            '(' | '[' => {
                nesting += 1;
                if nesting > MAX_RULE_DEPTH {
                    return Err(too_deep());
                }
            }
            ')' | ']' => nesting = nesting.saturating_sub(1),
            '^' => {
                exponents += 1;
                if exponents > MAX_RULE_DEPTH {
                    return Err(too_deep());
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Whether an expression denotes a single value or a whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Series,
}

struct Built {
    expr: Expr,
    shape: Shape,
    depth: usize,
}

impl Built {
    fn leaf(expr: Expr, shape: Shape) -> Self {
        Self {
            expr,
            shape,
            depth: 1,
        }
    }
}

fn nest(depth: usize) -> ChartResult<usize> {
    let depth = depth + 1;
    if depth > MAX_RULE_DEPTH {
        return Err(too_deep());
    }
    Ok(depth)
}

#[derive(Default)]
struct AstBuilder {
    references: SmallVec<[SeriesRef; 4]>,
    filter_slots: usize,
}

impl AstBuilder {
    fn build(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        match pair.as_rule() {
            Rule::expr => {
                let inner = next_inner(pair)?;
                self.build(inner)
            }
            Rule::comparison | Rule::additive | Rule::multiplicative => self.build_infix(pair),
            Rule::unary => self.build_unary(pair),
            Rule::power => self.build_power(pair),
            Rule::postfix => self.build_postfix(pair),
            Rule::number => {
                let text = pair.as_str();
                let value = text
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("invalid number `{text}`: {e}")))?;
                if !value.is_finite() {
                    return Err(invalid(format!("number `{text}` is out of range")));
                }
                Ok(Built::leaf(Expr::Number(value), Shape::Scalar))
            }
            Rule::placeholder => self.build_placeholder(pair),
            Rule::call => self.build_call(pair),
            Rule::identifier => match pair.as_str() {
                INDEX_IDENT => Ok(Built::leaf(Expr::Index, Shape::Scalar)),
                other => Err(invalid(format!("unknown identifier `{other}`"))),
            },
            other => Err(invalid(format!("unexpected rule {other:?}"))),
        }
    }

    /// Left-associative chain of `operand (op operand)*`.
    fn build_infix(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let mut pairs = pair.into_inner();
        let first = pairs
            .next()
            .ok_or_else(|| invalid("missing left operand".to_owned()))?;
        let mut built = self.build(first)?;

        while let Some(op_pair) = pairs.next() {
            let op = BinaryOp::from_token(op_pair.as_str())
                .ok_or_else(|| invalid(format!("unknown operator `{}`", op_pair.as_str())))?;
            let right_pair = pairs
                .next()
                .ok_or_else(|| invalid(format!("missing operand after `{}`", op_pair.as_str())))?;
            let right = self.build(right_pair)?;
            built = binary(op, built, right)?;
        }

        Ok(built)
    }

    /// Negations cancel pairwise, so at most one `Negate` node is emitted.
    fn build_unary(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let mut negations = 0usize;
        let mut operand = None;
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::neg {
                negations += 1;
            } else {
                operand = Some(self.build(inner)?);
            }
        }

        let built = operand.ok_or_else(|| invalid("missing operand".to_owned()))?;
        if negations % 2 == 0 {
            return Ok(built);
        }
        Ok(Built {
            depth: nest(built.depth)?,
            shape: built.shape,
            expr: Expr::Negate(Box::new(built.expr)),
        })
    }

    fn build_power(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let mut pairs = pair.into_inner();
        let base_pair = pairs
            .next()
            .ok_or_else(|| invalid("missing power base".to_owned()))?;
        let base = self.build(base_pair)?;
        match pairs.next() {
            Some(exponent) => {
                let exponent = self.build(exponent)?;
                binary(BinaryOp::Power, base, exponent)
            }
            None => Ok(base),
        }
    }

    fn build_postfix(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let mut pairs = pair.into_inner();
        let primary = pairs
            .next()
            .ok_or_else(|| invalid("missing primary expression".to_owned()))?;
        let mut built = self.build(primary)?;

        for subscript in pairs {
            let index = self.build(next_inner(subscript)?)?;
            if built.shape != Shape::Series {
                return Err(invalid("only whole-series values can be indexed".to_owned()));
            }
            if index.shape != Shape::Scalar {
                return Err(invalid("series index must be a scalar".to_owned()));
            }
            built = Built {
                depth: nest(built.depth.max(index.depth))?,
                shape: Shape::Scalar,
                expr: Expr::Subscript {
                    target: Box::new(built.expr),
                    index: Box::new(index.expr),
                },
            };
        }
        Ok(built)
    }

    fn build_placeholder(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let body = next_inner(pair)?;
        let (reference, per_step) = match body.as_rule() {
            Rule::selected_step => (SeriesRef::Selected, true),
            Rule::selected_series => (SeriesRef::Selected, false),
            Rule::step_ref => (named_ref(next_inner(body)?)?, true),
            Rule::series_ref => (named_ref(next_inner(body)?)?, false),
            other => return Err(invalid(format!("unexpected placeholder {other:?}"))),
        };

        if !self.references.contains(&reference) {
            self.references.push(reference.clone());
        }
        Ok(if per_step {
            Built::leaf(Expr::Step(reference), Shape::Scalar)
        } else {
            Built::leaf(Expr::Series(reference), Shape::Series)
        })
    }

    fn build_call(&mut self, pair: Pair<'_, Rule>) -> ChartResult<Built> {
        let mut pairs = pair.into_inner();
        let name = pairs
            .next()
            .ok_or_else(|| invalid("missing function name".to_owned()))?
            .as_str()
            .to_owned();
        let mut args = pairs
            .map(|arg| self.build(arg))
            .collect::<ChartResult<Vec<_>>>()?;

        if name != FILTER_IDENT {
            return Err(invalid(format!("unknown function `{name}`")));
        }
        if args.len() != 3 {
            return Err(invalid(format!(
                "`{FILTER_IDENT}` expects 3 arguments (series, low, high), got {}",
                args.len()
            )));
        }

        let high = args.pop();
        let low = args.pop();
        let series = args.pop();
        let (Some(series), Some(low), Some(high)) = (series, low, high) else {
            return Err(invalid("missing filter arguments".to_owned()));
        };
        if series.shape != Shape::Series {
            return Err(invalid(
                "filter expects a whole-series first argument".to_owned(),
            ));
        }
        if low.shape != Shape::Scalar || high.shape != Shape::Scalar {
            return Err(invalid("filter cutoffs must be scalars".to_owned()));
        }

        let slot = self.filter_slots;
        self.filter_slots += 1;
        Ok(Built {
            depth: nest(series.depth.max(low.depth).max(high.depth))?,
            shape: Shape::Series,
            expr: Expr::Filter {
                slot,
                series: Box::new(series.expr),
                low: Box::new(low.expr),
                high: Box::new(high.expr),
            },
        })
    }
}

/// Scalars broadcast over series, so the result is a series if either side
/// is one.
fn binary(op: BinaryOp, left: Built, right: Built) -> ChartResult<Built> {
    let shape = if left.shape == Shape::Series || right.shape == Shape::Series {
        Shape::Series
    } else {
        Shape::Scalar
    };
    Ok(Built {
        depth: nest(left.depth.max(right.depth))?,
        shape,
        expr: Expr::Binary {
            op,
            left: Box::new(left.expr),
            right: Box::new(right.expr),
        },
    })
}

fn next_inner(pair: Pair<'_, Rule>) -> ChartResult<Pair<'_, Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| invalid(format!("empty {rule:?} node")))
}

fn named_ref(label: Pair<'_, Rule>) -> ChartResult<SeriesRef> {
    let label = label.as_str().trim();
    if label.is_empty() {
        return Err(invalid("placeholder label must not be empty".to_owned()));
    }
    Ok(SeriesRef::Named(label.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let parsed = parse_rule("1 + 2 * 3").expect("parse");
        let Expr::Binary { op, right, .. } = parsed.ast else {
            panic!("expected binary root");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
    }

    #[test]
    fn placeholders_are_collected_once() {
        let parsed = parse_rule("{GDP} + {*GDP} + {*CPI} + {!*}").expect("parse");
        assert_eq!(
            parsed.references.as_slice(),
            &[
                SeriesRef::Named("GDP".to_owned()),
                SeriesRef::Named("CPI".to_owned()),
                SeriesRef::Selected,
            ]
        );
    }

    #[test]
    fn labels_may_contain_spaces() {
        let parsed = parse_rule("{*Crude oil price}").expect("parse");
        assert_eq!(
            parsed.ast,
            Expr::Step(SeriesRef::Named("Crude oil price".to_owned()))
        );
    }

    #[test]
    fn filter_calls_get_distinct_slots() {
        let parsed =
            parse_rule("filter({A}, 0, 0.5)[i] - filter({A}, 0.5, 1)[i]").expect("parse");
        assert_eq!(parsed.filter_slots, 2);
    }

    #[test]
    fn double_negation_cancels() {
        assert_eq!(parse_rule("--1").expect("parse").ast, Expr::Number(1.0));
        assert_eq!(
            parse_rule("---1").expect("parse").ast,
            Expr::Negate(Box::new(Expr::Number(1.0)))
        );
    }

    #[test]
    fn depth_limit_counts_operators_and_brackets() {
        let at_limit = vec!["1"; MAX_RULE_DEPTH].join("+");
        assert!(parse_rule(&at_limit).is_ok());

        let past_limit = vec!["1"; MAX_RULE_DEPTH + 2].join("+");
        assert!(matches!(
            parse_rule(&past_limit),
            Err(ChartError::InvalidExpression(_))
        ));

        let nested = format!(
            "{}1{}",
            "(".repeat(MAX_RULE_DEPTH + 1),
            ")".repeat(MAX_RULE_DEPTH + 1)
        );
        assert!(parse_rule(&nested).is_err());

        // Brackets inside labels are not nesting.
        let label = format!("{{*{}}}", "(".repeat(MAX_RULE_DEPTH + 1));
        assert!(parse_rule(&label).is_ok());
    }

    #[test]
    fn shapes_are_checked_before_evaluation() {
        for text in [
            "{*A}[0]",
            "{A}[{B}]",
            "filter({*A}, 0, 1)",
            "filter({A}, {B}, 1)",
            "(1 + 2)[0]",
        ] {
            let err = parse_rule(text).expect_err(text);
            assert!(matches!(err, ChartError::InvalidExpression(_)), "{text}");
        }
        assert!(parse_rule("({A} * 2)[i - 1] + filter({A} - {B}, 0, 0.5)[0]").is_ok());
    }

    #[test]
    fn malformed_input_is_invalid_expression() {
        for text in ["{A", "1 +", "foo + 1", "max(1, 2)", "filter({A}, 1)", "1e999", ""] {
            let err = parse_rule(text).expect_err(text);
            assert!(matches!(err, ChartError::InvalidExpression(_)), "{text}");
        }
    }
}
