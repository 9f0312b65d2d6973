use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::super::domain::{Expense, Rule};

/// Parse a rule or expense instant. Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (UTC),
/// or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Temporal window check. An unparsable bound closes the window.
pub(crate) fn is_effective(rule: &Rule, at: DateTime<Utc>) -> bool {
    let Some(from) = parse_instant(&rule.effective_from) else {
        return false;
    };
    if at < from {
        return false;
    }

    match rule.effective_to.as_deref() {
        Some(raw) => parse_instant(raw).is_some_and(|to| at <= to),
        None => true,
    }
}

fn selector_matches(selector: Option<&str>, value: Option<&str>) -> bool {
    match selector {
        Some(expected) => value == Some(expected),
        None => true,
    }
}

/// Whether `rule` applies to `expense` at `at`: inside its validity window and every present
/// selector equal (case-sensitive) to the expense's field.
pub fn applies(rule: &Rule, expense: &Expense, at: DateTime<Utc>) -> bool {
    if !is_effective(rule, at) {
        return false;
    }

    let selectors = &rule.selectors;
    selector_matches(selectors.region.as_deref(), Some(expense.region.as_str()))
        && selector_matches(
            selectors.department.as_deref(),
            expense.department.as_deref(),
        )
        && selector_matches(
            selectors.category.as_deref(),
            Some(expense.category.as_str()),
        )
}
