use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Monetary amount tagged with a three-letter currency code.
///
/// Currencies are compared by exact string equality; no conversion ever happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn same_currency(&self, currency: &str) -> bool {
        self.currency == currency
    }
}

/// Expense under evaluation, as handed over by the extraction/clarification pipeline.
///
/// `date` is kept as the raw instant string so the engine can reject it eagerly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(alias = "dateISO")]
    pub date: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub category: String,
    pub total: Money,
}

/// Approval stage. The five canonical stages are closed; rules may name others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Step {
    Compliance,
    Hr,
    It,
    Manager,
    Finance,
    Custom(String),
}

impl Step {
    /// Walk order for the canonical stages.
    pub const CANONICAL_ORDER: [Step; 5] = [
        Step::Compliance,
        Step::Hr,
        Step::It,
        Step::Manager,
        Step::Finance,
    ];

    /// Stages every expense starts with, regardless of the rule set.
    pub const BASELINE: [Step; 2] = [Step::Finance, Step::Manager];

    pub fn as_str(&self) -> &str {
        match self {
            Step::Compliance => "compliance",
            Step::Hr => "hr",
            Step::It => "it",
            Step::Manager => "manager",
            Step::Finance => "finance",
            Step::Custom(name) => name,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Step::Custom(_))
    }
}

impl From<&str> for Step {
    fn from(value: &str) -> Self {
        match value {
            "compliance" => Step::Compliance,
            "hr" => Step::Hr,
            "it" => Step::It,
            "manager" => Step::Manager,
            "finance" => Step::Finance,
            other => Step::Custom(other.to_string()),
        }
    }
}

impl From<String> for Step {
    fn from(value: String) -> Self {
        match Step::from(value.as_str()) {
            Step::Custom(_) => Step::Custom(value),
            canonical => canonical,
        }
    }
}

impl From<Step> for String {
    fn from(value: Step) -> Self {
        match value {
            Step::Custom(name) => name,
            canonical => canonical.as_str().to_string(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versioned business rule. Identity is `id`; instances are never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    /// Lower values are applied first.
    pub priority: i64,
    pub effective_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<String>,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub effect: RuleEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Optional match constraints; an unset selector is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Independent routing consequences; any combination may be present on one rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEffect {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub always_require_steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require_steps_if: Vec<ConditionalRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_steps_below: Vec<SkipThreshold>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_routes: BTreeMap<String, Vec<Step>>,
}

impl RuleEffect {
    pub fn is_empty(&self) -> bool {
        self.always_require_steps.is_empty()
            && self.require_steps_if.is_empty()
            && self.skip_steps_below.is_empty()
            && self.category_routes.is_empty()
    }
}

/// Steps required only when the `when` condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRequirement {
    pub when: AmountCondition,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_gt: Option<Money>,
}

impl AmountCondition {
    /// Strictly greater, same currency only. A missing threshold never matches.
    pub fn is_met_by(&self, total: &Money) -> bool {
        match &self.amount_gt {
            Some(threshold) => {
                total.same_currency(&threshold.currency) && total.amount > threshold.amount
            }
            None => false,
        }
    }
}

/// Candidate amount at or under which `step` may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipThreshold {
    pub step: Step,
    pub amount: f64,
    pub currency: String,
}

/// Audit record linking one triggered effect to the rule that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHit {
    pub rule_id: String,
    pub reason: String,
}

impl RuleHit {
    pub(crate) fn new(rule_id: &str, reason: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Routing outcome: included steps in canonical order, skipped steps, and the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub steps: Vec<Step>,
    pub skipped: Vec<Step>,
    pub rule_hits: Vec<RuleHit>,
}

impl Decision {
    pub fn includes(&self, step: &Step) -> bool {
        self.steps.contains(step)
    }

    pub fn skips(&self, step: &Step) -> bool {
        self.skipped.contains(step)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::as_str).collect()
    }

    pub fn skipped_names(&self) -> Vec<&str> {
        self.skipped.iter().map(Step::as_str).collect()
    }
}
