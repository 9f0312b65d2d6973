//! Deterministic policy evaluation.
//!
//! `evaluate` is a pure function of its inputs: it filters rules by validity window and
//! selectors, folds their effects in priority order, and resolves the final step list. It never
//! performs I/O and never mutates the rule set, so one snapshot can serve any number of
//! concurrent callers.

mod applicability;
pub(crate) mod effects;
pub(crate) mod resolver;

pub(crate) use applicability::is_effective;
pub use applicability::{applies, parse_instant};

use super::domain::{Decision, Expense, Rule};
use tracing::debug;

/// The single failure mode of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid expense date: {value:?}")]
    InvalidExpenseDate { value: String },
}

/// Route `expense` through `rules`.
///
/// Malformed rule dates and currency mismatches never fail the evaluation; they only make a rule
/// or an effect inapplicable.
pub fn evaluate(expense: &Expense, rules: &[Rule]) -> Result<Decision, EvaluationError> {
    let at = parse_instant(&expense.date).ok_or_else(|| EvaluationError::InvalidExpenseDate {
        value: expense.date.clone(),
    })?;

    let active = effects::applicable_rules(rules, expense, at);
    let aggregation = effects::aggregate(&active, expense);
    let resolution = resolver::resolve(
        &aggregation.required,
        &aggregation.routed,
        &aggregation.skip_thresholds,
        &expense.total,
    );

    let mut rule_hits = aggregation.hits;
    rule_hits.extend(resolution.hits);

    debug!(
        rules = rules.len(),
        applicable = active.len(),
        steps = resolution.steps.len(),
        skipped = resolution.skipped.len(),
        "expense evaluated"
    );

    Ok(Decision {
        steps: resolution.steps,
        skipped: resolution.skipped,
        rule_hits,
    })
}
