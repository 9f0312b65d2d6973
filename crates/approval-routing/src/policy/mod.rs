//! Expense approval routing driven by versioned business rules.

pub mod domain;
pub mod evaluation;
pub mod router;
pub mod snapshot;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AmountCondition, ConditionalRequirement, Decision, Expense, Money, Rule, RuleEffect, RuleHit,
    Selectors, SkipThreshold, Step,
};
pub use evaluation::{applies, evaluate, parse_instant, EvaluationError};
pub use router::policy_router;
pub use snapshot::{PolicyStore, RuleSet};
pub use validation::{validate_rules, RuleViolation};
