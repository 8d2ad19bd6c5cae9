//! Broker portal — Axum web server over the in-memory application book.
//!
//! Serves a REST API and a self-contained HTML portal page.
//! CORS enabled for local development.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// The embedded portal HTML (compiled into the binary).
const PORTAL_HTML: &str = include_str!("templates/index.html");

/// Start the portal web server.
///
/// This spawns a background task — it doesn't block.
pub fn spawn_dashboard(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    tokio::spawn(async move {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        info!(port, "Broker portal starting on http://localhost:{port}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind portal port");

        axum::serve(listener, app)
            .await
            .expect("Portal server error");
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route(
            "/api/applications",
            get(routes::list_applications).post(routes::add_application),
        )
        .route("/api/stats", get(routes::get_stats))
        .route("/health", get(routes::health))
        // Portal HTML
        .route("/", get(serve_portal))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML portal.
async fn serve_portal() -> Html<&'static str> {
    Html(PORTAL_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
