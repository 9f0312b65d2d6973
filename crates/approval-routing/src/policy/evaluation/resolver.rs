use std::collections::BTreeMap;

use super::super::domain::{Money, RuleHit, Step};
use super::effects::{RetainedThreshold, StepSet};

pub(crate) struct Resolution {
    pub steps: Vec<Step>,
    pub skipped: Vec<Step>,
    pub hits: Vec<RuleHit>,
}

/// Turn the aggregated accumulators into included/skipped steps.
///
/// Baseline is routed ∪ required ∪ {finance, manager}, in that insertion order. Canonical steps
/// are walked in `Step::CANONICAL_ORDER` and may be skipped; custom steps follow in first-seen
/// order and are never skipped. A required step is never skipped.
pub(crate) fn resolve(
    required: &StepSet,
    routed: &StepSet,
    skip_thresholds: &BTreeMap<Step, RetainedThreshold>,
    total: &Money,
) -> Resolution {
    let baseline: StepSet = routed
        .iter()
        .chain(required.iter())
        .cloned()
        .chain(Step::BASELINE)
        .collect();

    let mut steps = Vec::with_capacity(baseline.len());
    let mut skipped = Vec::new();
    let mut hits = Vec::new();

    for step in Step::CANONICAL_ORDER {
        if !baseline.contains(&step) {
            continue;
        }

        let skip = skip_thresholds
            .get(&step)
            .filter(|threshold| !required.contains(&step) && skips(threshold, total));
        match skip {
            Some(threshold) => {
                hits.push(RuleHit::new(
                    &threshold.rule_id,
                    format!(
                        "skip_steps_below(<={} {})",
                        threshold.amount, threshold.currency
                    ),
                ));
                skipped.push(step);
            }
            None => steps.push(step),
        }
    }

    steps.extend(baseline.iter().filter(|step| !step.is_canonical()).cloned());

    Resolution {
        steps,
        skipped,
        hits,
    }
}

fn skips(threshold: &RetainedThreshold, total: &Money) -> bool {
    total.same_currency(&threshold.currency) && total.amount <= threshold.amount
}
