use super::common::*;
use crate::policy::domain::{RuleHit, Step};
use crate::policy::evaluation::{evaluate, EvaluationError};

#[test]
fn rejects_unparsable_expense_date() {
    let mut expense = us_ride(10.0);
    expense.date = "next tuesday".to_string();

    let err = evaluate(&expense, &[rule("global", 1)]).expect_err("date is invalid");

    assert_eq!(
        err,
        EvaluationError::InvalidExpenseDate {
            value: "next tuesday".to_string()
        }
    );
}

#[test]
fn invalid_expense_date_wins_even_without_rules() {
    let mut expense = us_ride(10.0);
    expense.date = String::new();
    assert!(evaluate(&expense, &[]).is_err());
}

#[test]
fn no_rules_yields_baseline() {
    let decision = evaluate(&us_ride(10.0), &[]).expect("evaluates");

    assert_eq!(decision.step_names(), vec!["manager", "finance"]);
    assert!(decision.skipped.is_empty());
    assert!(decision.rule_hits.is_empty());
}

#[test]
fn skip_hits_follow_aggregation_hits() {
    let rules = vec![
        skipping(rule("skip-manager", 5), "manager", 50.0, "USD"),
        requiring(rule("needs-it", 10), &["it"]),
    ];

    let decision = evaluate(&us_ride(49.0), &rules).expect("evaluates");

    assert_eq!(decision.steps, vec![Step::It, Step::Finance]);
    assert_eq!(decision.skipped, vec![Step::Manager]);
    assert_eq!(
        decision.rule_hits,
        vec![
            RuleHit::new("needs-it", "always_require_steps"),
            RuleHit::new("skip-manager", "skip_steps_below(<=50 USD)"),
        ]
    );
}

#[test]
fn require_beats_skip_across_rules() {
    let rules = vec![
        skipping(rule("skip-manager", 1), "manager", 500.0, "USD"),
        requiring_above(rule("big-ticket", 99), 10.0, "USD", &["manager"]),
    ];

    let decision = evaluate(&us_ride(20.0), &rules).expect("evaluates");

    assert!(decision.includes(&Step::Manager));
    assert!(!decision.skips(&Step::Manager));
}

#[test]
fn rule_with_broken_window_is_ignored_not_fatal() {
    let mut broken = requiring(rule("broken", 1), &["compliance"]);
    broken.effective_from = "2024-13-45".to_string();
    let rules = vec![broken, requiring(rule("healthy", 2), &["hr"])];

    let decision = evaluate(&us_ride(20.0), &rules).expect("evaluates");

    assert_eq!(decision.step_names(), vec!["hr", "manager", "finance"]);
    assert_eq!(decision.rule_hits.len(), 1);
    assert_eq!(decision.rule_hits[0].rule_id, "healthy");
}

#[test]
fn priority_ties_preserve_input_order_in_audit_trail() {
    let rules = vec![
        requiring(rule("zeta", 10), &["hr"]),
        requiring(rule("alpha", 10), &["it"]),
        requiring(rule("first", 1), &["compliance"]),
    ];

    let decision = evaluate(&us_ride(20.0), &rules).expect("evaluates");

    let order: Vec<&str> = decision
        .rule_hits
        .iter()
        .map(|hit| hit.rule_id.as_str())
        .collect();
    assert_eq!(order, vec!["first", "zeta", "alpha"]);
}

#[test]
fn evaluation_is_deterministic_and_leaves_inputs_untouched() {
    let rules = vec![
        scoped(skipping(rule("us-ride", 10), "manager", 50.0, "USD"), "US", "ride_hail"),
        routing(rule("routes", 20), "ride_hail", &["travel_desk", "compliance"]),
        requiring_above(rule("large", 30), 40.0, "USD", &["hr"]),
    ];
    let expense = us_ride(45.0);
    let rules_before = rules.clone();
    let expense_before = expense.clone();

    let first = evaluate(&expense, &rules).expect("evaluates");
    let second = evaluate(&expense, &rules).expect("evaluates");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
    assert_eq!(rules, rules_before);
    assert_eq!(expense, expense_before);
    assert_eq!(
        first.step_names(),
        vec!["compliance", "hr", "finance", "travel_desk"]
    );
    assert_eq!(first.skipped_names(), vec!["manager"]);
}
