use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{Decision, Expense, Rule};
use super::evaluation::{evaluate, is_effective, EvaluationError};

/// Immutable, versioned rule set. Once built it is only ever shared, never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    pub version: u64,
    pub installed_at: DateTime<Utc>,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(version: u64, rules: Vec<Rule>) -> Self {
        Self {
            version,
            installed_at: Utc::now(),
            rules,
        }
    }

    /// Rules whose validity window contains `at`. Unparsable windows are excluded.
    pub fn active_on(&self, at: DateTime<Utc>) -> Vec<Rule> {
        self.rules
            .iter()
            .filter(|rule| is_effective(rule, at))
            .cloned()
            .collect()
    }

    pub fn evaluate(&self, expense: &Expense) -> Result<Decision, EvaluationError> {
        evaluate(expense, &self.rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Owner of the current rule-set snapshot.
///
/// Readers clone the `Arc` and evaluate against it lock-free; `replace` swaps the reference.
/// A snapshot held by an in-flight evaluation stays valid after a replacement.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<RuleSet>>,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PolicyStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            current: RwLock::new(Arc::new(RuleSet::new(1, rules))),
        }
    }

    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `rules` as a new snapshot and return it.
    pub fn replace(&self, rules: Vec<Rule>) -> Arc<RuleSet> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(RuleSet::new(guard.version + 1, rules));
        *guard = Arc::clone(&next);
        drop(guard);

        info!(
            version = next.version,
            rules = next.len(),
            "policy snapshot replaced"
        );
        next
    }
}
