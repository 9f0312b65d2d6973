use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{Expense, Rule};
use super::evaluation::parse_instant;
use super::snapshot::PolicyStore;
use super::validation::validate_rules;
use crate::error::AppError;

/// Router exposing expense evaluation and snapshot management over HTTP.
pub fn policy_router(store: Arc<PolicyStore>) -> Router {
    Router::new()
        .route("/api/v1/expenses/decision", post(decision_handler))
        .route(
            "/api/v1/policies",
            get(policies_handler).put(replace_handler),
        )
        .with_state(store)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PoliciesQuery {
    #[serde(default)]
    pub(crate) date: Option<String>,
    #[serde(default)]
    pub(crate) all: bool,
}

pub(crate) async fn decision_handler(
    State(store): State<Arc<PolicyStore>>,
    axum::Json(expense): axum::Json<Expense>,
) -> Response {
    let snapshot = store.snapshot();
    match snapshot.evaluate(&expense) {
        Ok(decision) => {
            let payload = json!({
                "rule_set_version": snapshot.version,
                "decision": decision,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            warn!(%error, "expense rejected");
            AppError::from(error).into_response()
        }
    }
}

pub(crate) async fn policies_handler(
    State(store): State<Arc<PolicyStore>>,
    Query(query): Query<PoliciesQuery>,
) -> Response {
    let requested = query.date.unwrap_or_else(|| Utc::now().to_rfc3339());
    let Some(at) = parse_instant(&requested) else {
        return AppError::InvalidDate { value: requested }.into_response();
    };

    let snapshot = store.snapshot();
    let mut payload = json!({
        "rule_set_version": snapshot.version,
        "requested_date": requested,
        "total_rules": snapshot.len(),
        "active": snapshot.active_on(at),
    });
    if query.all {
        payload["all"] = json!(snapshot.rules);
    }

    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn replace_handler(
    State(store): State<Arc<PolicyStore>>,
    axum::Json(rules): axum::Json<Vec<Rule>>,
) -> Response {
    if let Err(violation) = validate_rules(&rules) {
        warn!(%violation, "policy replacement rejected");
        return AppError::from(violation).into_response();
    }

    let snapshot = store.replace(rules);
    let payload = json!({
        "rule_set_version": snapshot.version,
        "total_rules": snapshot.len(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
