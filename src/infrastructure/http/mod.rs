pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    conversion::ConversionController, health::HealthController, jobs::JobsController,
};
use crate::infrastructure::config::Config;

/// Room for the non-file form fields and multipart framing
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Controllers and limits the router is built from
pub struct AppControllers {
    pub health: Arc<HealthController>,
    pub conversion: Arc<ConversionController>,
    pub jobs: Arc<JobsController>,
    pub max_upload_bytes: usize,
}

/// Build the application router with all routes and layers
pub fn build_router(controllers: AppControllers) -> Router {
    let health_routes = Router::new()
        .route("/health", get(HealthController::health))
        .route("/health/ready", get(HealthController::health_ready))
        .route("/status", get(HealthController::status))
        .with_state(controllers.health);

    let conversion_routes = Router::new()
        .route("/convert", post(ConversionController::convert))
        .route("/convert-form", post(ConversionController::convert_form))
        .route("/download/:id", get(ConversionController::download))
        .with_state(controllers.conversion)
        .layer(DefaultBodyLimit::max(
            controllers.max_upload_bytes + FORM_OVERHEAD_BYTES,
        ));

    let job_routes = Router::new()
        .route("/jobs", get(JobsController::list_jobs))
        .route(
            "/jobs/:id",
            get(JobsController::get_job).delete(JobsController::delete_job),
        )
        .route(
            "/cleanup",
            get(JobsController::cleanup).post(JobsController::cleanup),
        )
        .with_state(controllers.jobs);

    Router::new()
        .merge(health_routes)
        .merge(conversion_routes)
        .merge(job_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `app` until `shutdown` resolves
pub async fn start_http_server(
    config: &Config,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
