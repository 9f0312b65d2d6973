use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::super::domain::{Expense, Rule, RuleHit, Step};
use super::applicability::applies;

/// Insertion-ordered set of steps; first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StepSet {
    steps: Vec<Step>,
}

impl StepSet {
    pub(crate) fn insert(&mut self, step: Step) -> bool {
        if self.contains(&step) {
            return false;
        }
        self.steps.push(step);
        true
    }

    pub(crate) fn contains(&self, step: &Step) -> bool {
        self.steps.contains(step)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }
}

impl FromIterator<Step> for StepSet {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        let mut set = StepSet::default();
        for step in iter {
            set.insert(step);
        }
        set
    }
}

/// Largest same-currency skip threshold seen for a step, and the rule that set it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RetainedThreshold {
    pub amount: f64,
    pub currency: String,
    pub rule_id: String,
}

/// Accumulators produced by folding every applicable rule in priority order.
#[derive(Debug, Default)]
pub(crate) struct Aggregation {
    pub required: StepSet,
    pub routed: StepSet,
    pub skip_thresholds: BTreeMap<Step, RetainedThreshold>,
    pub hits: Vec<RuleHit>,
}

/// Applicable rules sorted by ascending priority; ties keep their input order.
pub(crate) fn applicable_rules<'a>(
    rules: &'a [Rule],
    expense: &Expense,
    at: DateTime<Utc>,
) -> Vec<&'a Rule> {
    let mut active: Vec<&Rule> = rules
        .iter()
        .filter(|rule| applies(rule, expense, at))
        .collect();
    active.sort_by_key(|rule| rule.priority);
    active
}

pub(crate) fn aggregate(rules: &[&Rule], expense: &Expense) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for rule in rules {
        apply_rule(&mut aggregation, rule, expense);
    }
    aggregation
}

fn apply_rule(aggregation: &mut Aggregation, rule: &Rule, expense: &Expense) {
    let effect = &rule.effect;
    let total = &expense.total;

    for step in &effect.always_require_steps {
        aggregation.required.insert(step.clone());
        aggregation
            .hits
            .push(RuleHit::new(&rule.id, "always_require_steps"));
    }

    for requirement in &effect.require_steps_if {
        let Some(threshold) = requirement.when.amount_gt.as_ref() else {
            continue;
        };
        if !requirement.when.is_met_by(total) {
            continue;
        }
        let reason = format!(
            "require_steps_if.amount_gt(>{} {})",
            threshold.amount, threshold.currency
        );
        for step in &requirement.steps {
            aggregation.required.insert(step.clone());
            aggregation.hits.push(RuleHit::new(&rule.id, reason.clone()));
        }
    }

    if let Some(steps) = effect.category_routes.get(&expense.category) {
        let reason = format!("category_routes.{}", expense.category);
        for step in steps {
            aggregation.routed.insert(step.clone());
            aggregation.hits.push(RuleHit::new(&rule.id, reason.clone()));
        }
    }

    for threshold in &effect.skip_steps_below {
        if !total.same_currency(&threshold.currency) {
            continue;
        }
        let replace = aggregation
            .skip_thresholds
            .get(&threshold.step)
            .map_or(true, |retained| threshold.amount > retained.amount);
        if replace {
            aggregation.skip_thresholds.insert(
                threshold.step.clone(),
                RetainedThreshold {
                    amount: threshold.amount,
                    currency: threshold.currency.clone(),
                    rule_id: rule.id.clone(),
                },
            );
        }
    }
}
