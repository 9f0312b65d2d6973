use approval_routing::error::AppError;
use approval_routing::policy::{validate_rules, Expense, Rule};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|source| AppError::document(path, source))
}

pub(crate) fn read_rules(path: &Path) -> Result<Vec<Rule>, AppError> {
    let rules: Vec<Rule> = read_json(path)?;
    validate_rules(&rules)?;
    Ok(rules)
}

pub(crate) fn read_expense(path: &Path) -> Result<Expense, AppError> {
    read_json(path)
}
