use crate::cli::ServeArgs;
use crate::infra::{build_session, AppState};
use crate::routes::with_projection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fiscal_projection::config::AppConfig;
use fiscal_projection::error::AppError;
use fiscal_projection::telemetry;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let session = build_session(&config.scoring, &args.scoring);
    let model_loaded = session.scorer().is_available();
    let threshold = session.threshold().value();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        model_loaded,
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_projection_routes(Arc::new(Mutex::new(session)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, model_loaded, threshold, "fiscal projection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
