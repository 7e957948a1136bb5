use crate::cli::ServeArgs;
use crate::infra::{AppState, FixtureLookup};
use crate::routes::with_certificate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cert_gen::certificates::CertificateService;
use cert_gen::config::AppConfig;
use cert_gen::error::AppError;
use cert_gen::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lookup = match &config.certificates.fixtures_path {
        Some(path) => FixtureLookup::from_path(path)?,
        None => {
            warn!("CERT_FIXTURES_PATH not set; lookups will answer not found");
            FixtureLookup::default()
        }
    };
    let certificate_service = Arc::new(CertificateService::new(
        Arc::new(lookup),
        config.certificates.clone(),
    ));

    let app = with_certificate_routes(certificate_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "certificate payload service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
