use std::collections::HashMap;

use super::ast::{Expr, SeriesRef};
use super::filter::band_filter;
use crate::core::{DatasetSnapshot, SeriesValue};
use crate::error::{ChartError, ChartResult};

/// Restricted evaluation namespace.
///
/// Exposes only the raw values of the series a rule references, the chart's
/// selected source series, and the span length. Nothing else in the dataset
/// or the host is reachable from a rule.
#[derive(Debug)]
pub struct Namespace<'a> {
    named: HashMap<&'a str, &'a [SeriesValue]>,
    selected: &'a [SeriesValue],
    len: usize,
}

impl<'a> Namespace<'a> {
    /// Resolves every reference against the snapshot.
    pub fn bind(
        snapshot: &'a DatasetSnapshot,
        selected_label: &str,
        references: &'a [SeriesRef],
    ) -> ChartResult<Self> {
        let selected = snapshot.require(selected_label)?.values();
        let mut named = HashMap::with_capacity(references.len());
        for reference in references {
            if let SeriesRef::Named(label) = reference {
                named.insert(label.as_str(), snapshot.require(label)?.values());
            }
        }
        Ok(Self {
            named,
            selected,
            len: snapshot.len(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lookup(&self, reference: &SeriesRef) -> ChartResult<&'a [SeriesValue]> {
        match reference {
            SeriesRef::Selected => Ok(self.selected),
            SeriesRef::Named(label) => self
                .named
                .get(label.as_str())
                .copied()
                .ok_or_else(|| ChartError::UnknownSeries(label.clone())),
        }
    }
}

/// Output of one `filter` call; `step` is `None` when the call does not
/// depend on the loop variable and the values hold for every timestep.
struct FilterOutput {
    step: Option<usize>,
    values: Vec<SeriesValue>,
}

/// Per-timestep evaluator.
///
/// Series-valued subexpressions are never materialized: every operator is
/// element-wise, so only the entry at the position being read is computed.
/// `filter` needs its whole input and keeps its output by slot.
pub struct Evaluator<'n, 'a> {
    namespace: &'n Namespace<'a>,
    filter_cache: Vec<Option<FilterOutput>>,
}

impl<'n, 'a> Evaluator<'n, 'a> {
    #[must_use]
    pub fn new(namespace: &'n Namespace<'a>, filter_slots: usize) -> Self {
        Self {
            namespace,
            filter_cache: (0..filter_slots).map(|_| None).collect(),
        }
    }

    /// Evaluates `expr` with the loop variable bound to `timestep`.
    ///
    /// A whole-series result resolves to its entry at `timestep`. `Ok(None)`
    /// means the entry is undefined (missing operand data, division by zero,
    /// index out of range); `Err` means the rule itself failed.
    pub fn evaluate_at(&mut self, expr: &Expr, timestep: usize) -> ChartResult<SeriesValue> {
        self.entry(expr, timestep, timestep)
    }

    /// Entry `position` of the value of `expr`; scalars ignore `position`.
    fn entry(&mut self, expr: &Expr, timestep: usize, position: usize) -> ChartResult<SeriesValue> {
        match expr {
            Expr::Number(value) => Ok(Some(*value)),
            Expr::Index => Ok(Some(timestep as f64)),
            Expr::Series(reference) => Ok(at(self.namespace.lookup(reference)?, position)),
            Expr::Step(reference) => Ok(at(self.namespace.lookup(reference)?, timestep)),
            Expr::Negate(inner) => Ok(self.entry(inner, timestep, position)?.map(|v| -v)),
            Expr::Binary { op, left, right } => {
                let left = self.entry(left, timestep, position)?;
                let right = self.entry(right, timestep, position)?;
                Ok(left.zip(right).and_then(|(a, b)| op.apply(a, b)))
            }
            Expr::Subscript { target, index } => {
                let Some(index) = self.entry(index, timestep, position)? else {
                    return Ok(None);
                };
                if index.fract() != 0.0 {
                    return Err(ChartError::InvalidExpression(format!(
                        "series index must be an integer, got {index}"
                    )));
                }
                if index < 0.0 || index >= self.namespace.len() as f64 {
                    return Ok(None);
                }
                self.entry(target, timestep, index as usize)
            }
            Expr::Filter { .. } => self.filter_entry(expr, timestep, position),
        }
    }

    fn filter_entry(
        &mut self,
        call: &Expr,
        timestep: usize,
        position: usize,
    ) -> ChartResult<SeriesValue> {
        let Expr::Filter {
            slot,
            series,
            low,
            high,
        } = call
        else {
            return Err(ChartError::InvalidExpression(
                "expected a filter call".to_owned(),
            ));
        };
        let slot = *slot;
        let fresh = matches!(
            self.filter_cache.get(slot),
            Some(Some(output)) if output.step.is_none_or(|step| step == timestep)
        );
        if !fresh {
            let low = self.cutoff(low, timestep, "low")?;
            let high = self.cutoff(high, timestep, "high")?;
            let input = (0..self.namespace.len())
                .map(|p| self.entry(series, timestep, p))
                .collect::<ChartResult<Vec<_>>>()?;
            let output = FilterOutput {
                step: (!call.is_step_invariant()).then_some(timestep),
                values: band_filter(&input, low, high)?,
            };
            match self.filter_cache.get_mut(slot) {
                Some(entry) => *entry = Some(output),
                None => return Ok(at(&output.values, position)),
            }
        }

        Ok(self
            .filter_cache
            .get(slot)
            .and_then(Option::as_ref)
            .and_then(|output| at(&output.values, position)))
    }

    fn cutoff(&mut self, expr: &Expr, timestep: usize, name: &str) -> ChartResult<f64> {
        self.entry(expr, timestep, timestep)?.ok_or_else(|| {
            ChartError::InvalidExpression(format!("filter {name} cutoff must be a present scalar"))
        })
    }
}

fn at(values: &[SeriesValue], position: usize) -> SeriesValue {
    values.get(position).copied().flatten()
}
