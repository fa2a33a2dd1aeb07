//! Axum HTTP server: router, listener, graceful shutdown.

use axum::extract::Request;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use request_id::{get_from_context, Context, MakeRequestId, RequestId, RequestIdLayer};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::EchoConfig;

/// Body returned by `/echo`.
#[derive(Debug, Serialize)]
struct EchoResponse {
    request_id: Option<String>,
    method: String,
    path: String,
}

/// Build the router with `request_ids` as the outermost layer.
///
/// The trace layer sits inside it so HTTP trace events land in the
/// request's `http_request` span.
pub fn router<P>(request_ids: RequestIdLayer<P>) -> Router
where
    P: MakeRequestId + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handle_health))
        .route("/echo", any(handle_echo))
        .route("/id", get(handle_id))
        .fallback(handle_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(request_ids)
}

/// Build and run the HTTP server.
pub async fn run(config: EchoConfig) -> anyhow::Result<()> {
    let listen_addr = config.server.listen_address.clone();
    let app = router(RequestIdLayer::default());

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "request-id-echo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("request-id-echo shut down gracefully");
    Ok(())
}

/// Report the request id the handler sees through its context.
async fn handle_echo(ctx: Context, method: Method, uri: Uri) -> Json<EchoResponse> {
    let request_id = get_from_context(Some(&ctx)).map(str::to_string);

    tracing::info!(method = %method, path = %uri.path(), "Echoing request");

    Json(EchoResponse {
        request_id,
        method: method.to_string(),
        path: uri.path().to_string(),
    })
}

/// Plain-text request id.
async fn handle_id(request_id: RequestId) -> String {
    request_id.into_inner()
}

async fn handle_fallback(request: Request) -> impl IntoResponse {
    tracing::debug!(path = %request.uri().path(), "No route matched");
    (StatusCode::NOT_FOUND, "not found")
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
