use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::policy::domain::{
    AmountCondition, ConditionalRequirement, Expense, Money, Rule, RuleEffect, Selectors,
    SkipThreshold, Step,
};
use crate::policy::snapshot::PolicyStore;

pub(super) fn expense(region: &str, category: &str, amount: f64, currency: &str) -> Expense {
    Expense {
        date: "2024-09-15T12:00:00Z".to_string(),
        region: region.to_string(),
        department: Some("engineering".to_string()),
        category: category.to_string(),
        total: Money::new(amount, currency),
    }
}

pub(super) fn us_ride(amount: f64) -> Expense {
    expense("US", "ride_hail", amount, "USD")
}

pub(super) fn evaluation_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 15, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn rule(id: &str, priority: i64) -> Rule {
    Rule {
        id: id.to_string(),
        name: format!("{id} rule"),
        priority,
        effective_from: "2024-01-01T00:00:00Z".to_string(),
        effective_to: None,
        selectors: Selectors::default(),
        effect: RuleEffect::default(),
        comment: None,
    }
}

pub(super) fn scoped(mut rule: Rule, region: &str, category: &str) -> Rule {
    rule.selectors = Selectors {
        region: Some(region.to_string()),
        department: None,
        category: Some(category.to_string()),
    };
    rule
}

pub(super) fn requiring(mut rule: Rule, steps: &[&str]) -> Rule {
    rule.effect.always_require_steps = steps.iter().map(|step| Step::from(*step)).collect();
    rule
}

pub(super) fn requiring_above(
    mut rule: Rule,
    amount: f64,
    currency: &str,
    steps: &[&str],
) -> Rule {
    rule.effect.require_steps_if.push(ConditionalRequirement {
        when: AmountCondition {
            amount_gt: Some(Money::new(amount, currency)),
        },
        steps: steps.iter().map(|step| Step::from(*step)).collect(),
    });
    rule
}

pub(super) fn skipping(mut rule: Rule, step: &str, amount: f64, currency: &str) -> Rule {
    rule.effect.skip_steps_below.push(SkipThreshold {
        step: Step::from(step),
        amount,
        currency: currency.to_string(),
    });
    rule
}

pub(super) fn routing(mut rule: Rule, category: &str, steps: &[&str]) -> Rule {
    rule.effect.category_routes.insert(
        category.to_string(),
        steps.iter().map(|step| Step::from(*step)).collect(),
    );
    rule
}

pub(super) fn steps(names: &[&str]) -> Vec<Step> {
    names.iter().map(|name| Step::from(*name)).collect()
}

pub(super) fn store_with(rules: Vec<Rule>) -> Arc<PolicyStore> {
    Arc::new(PolicyStore::new(rules))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
