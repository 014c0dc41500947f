//! HTTP API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use student_report_core::config::CorsConfig;
use student_report_core::{ApiClient, Config, PdfReportRenderer, ReportRenderer};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub client: ApiClient,
    pub renderer: Arc<dyn ReportRenderer>,
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server until Ctrl-C
pub async fn run_server(config: Config) -> Result<()> {
    let client = ApiClient::new(&config)?;
    let state = Arc::new(AppState {
        client,
        renderer: Arc::new(PdfReportRenderer::new()),
    });

    let app = create_router(state, &config.cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("PDF Generator service starting on {}", addr);
    info!("Available endpoints:");
    info!("  GET /health - Health check");
    info!("  GET /test/report - Generate test PDF report with mock data");
    info!("  GET /api/v1/students/{{id}}/report - Generate student PDF report");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Create the router with all routes
pub fn create_router(state: SharedState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/test/report", get(routes::test_report))
        .route("/api/v1/students/{*rest}", get(routes::student_report))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = if cors.allowed_origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(split_list(&cors.allowed_origins).filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    let methods = if cors.allowed_methods.trim() == "*" {
        AllowMethods::any()
    } else {
        AllowMethods::list(split_list(&cors.allowed_methods).filter_map(|method| {
            Method::from_bytes(method.as_bytes())
                .map_err(|_| warn!(method, "Ignoring invalid CORS method"))
                .ok()
        }))
    };

    let headers = if cors.allowed_headers.trim() == "*" {
        AllowHeaders::any()
    } else {
        AllowHeaders::list(split_list(&cors.allowed_headers).filter_map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| warn!(header = name, "Ignoring invalid CORS header"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
