//! Structural checks applied before a rule set is installed.
//!
//! The engine fails closed on malformed rules, which would hide authoring mistakes. Anything that
//! installs a snapshot from outside input runs `validate_rules` first and rejects the whole set on
//! the first violation.

use super::domain::Rule;
use super::evaluation::parse_instant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("rule {rule_id}: effective_from {value:?} is not a valid instant")]
    EffectiveFrom { rule_id: String, value: String },
    #[error("rule {rule_id}: effective_to {value:?} is not a valid instant")]
    EffectiveTo { rule_id: String, value: String },
    #[error("rule {rule_id}: currency {currency:?} in {field} must be a three-letter code")]
    Currency {
        rule_id: String,
        field: &'static str,
        currency: String,
    },
    #[error("rule {rule_id}: require_steps_if[{index}] lists no steps")]
    EmptyConditionalSteps { rule_id: String, index: usize },
    #[error("rule {rule_id}: category_routes.{category} lists no steps")]
    EmptyCategoryRoute { rule_id: String, category: String },
}

/// Check every rule, stopping at the first violation.
pub fn validate_rules(rules: &[Rule]) -> Result<(), RuleViolation> {
    rules.iter().try_for_each(validate_rule)
}

pub fn validate_rule(rule: &Rule) -> Result<(), RuleViolation> {
    if parse_instant(&rule.effective_from).is_none() {
        return Err(RuleViolation::EffectiveFrom {
            rule_id: rule.id.clone(),
            value: rule.effective_from.clone(),
        });
    }
    if let Some(to) = rule.effective_to.as_deref() {
        if parse_instant(to).is_none() {
            return Err(RuleViolation::EffectiveTo {
                rule_id: rule.id.clone(),
                value: to.to_string(),
            });
        }
    }

    let effect = &rule.effect;
    for (index, requirement) in effect.require_steps_if.iter().enumerate() {
        if requirement.steps.is_empty() {
            return Err(RuleViolation::EmptyConditionalSteps {
                rule_id: rule.id.clone(),
                index,
            });
        }
        if let Some(threshold) = &requirement.when.amount_gt {
            check_currency(rule, "require_steps_if.amount_gt", &threshold.currency)?;
        }
    }
    for threshold in &effect.skip_steps_below {
        check_currency(rule, "skip_steps_below", &threshold.currency)?;
    }
    if let Some((category, _)) = effect
        .category_routes
        .iter()
        .find(|(_, steps)| steps.is_empty())
    {
        return Err(RuleViolation::EmptyCategoryRoute {
            rule_id: rule.id.clone(),
            category: category.clone(),
        });
    }

    Ok(())
}

fn check_currency(rule: &Rule, field: &'static str, currency: &str) -> Result<(), RuleViolation> {
    if currency.chars().count() == 3 {
        return Ok(());
    }
    Err(RuleViolation::Currency {
        rule_id: rule.id.clone(),
        field,
        currency: currency.to_string(),
    })
}
