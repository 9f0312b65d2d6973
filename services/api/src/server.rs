use crate::cli::ServeArgs;
use crate::infra::{read_rules, AppState};
use crate::routes::with_policy_routes;
use approval_routing::config::AppConfig;
use approval_routing::error::AppError;
use approval_routing::policy::PolicyStore;
use approval_routing::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(rules) = args.rules.take() {
        config.policy.rules_path = Some(rules);
    }

    telemetry::init(&config.telemetry)?;

    let rules = match config.policy.rules_path.as_deref() {
        Some(path) => {
            let rules = read_rules(path)?;
            info!(path = %path.display(), rules = rules.len(), "initial policy snapshot loaded");
            rules
        }
        None => Vec::new(),
    };
    let store = Arc::new(PolicyStore::new(rules));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_policy_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "expense approval router ready");

    axum::serve(listener, app).await?;
    Ok(())
}
