//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that feeds every request to the engine
//! - Buffer request bodies up to the configured limit
//! - Wire up middleware (tracing, request ID, timeout, concurrency limit)
//! - Derive the per-request cancellation token from the shutdown token
//! - Serve until shutdown, then drain in-flight requests

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::lifecycle::Shutdown;

const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
    max_request_body_bytes: usize,
    shutdown: CancellationToken,
}

/// HTTP front end for an [`Engine`].
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    pub fn new(engine: Arc<Engine>, config: &ServerConfig, shutdown: Shutdown) -> Self {
        let state = AppState {
            engine,
            max_request_body_bytes: config.limits.max_request_body_bytes,
            shutdown: shutdown.token(),
        };
        let router = Self::build_router(config, state);
        Self { router, shutdown }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffer the body, then hand the request to the engine.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_request_body_bytes).await {
        Ok(body) => body,
        Err(error) => {
            let status = body_error_status(&error);
            tracing::warn!(%error, %status, limit = state.max_request_body_bytes, "request body rejected");
            return (status, body_error_message(status)).into_response();
        }
    };

    // Cancelled when the response is produced or the connection goes away.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();
    state.engine.serve(Request::from_parts(parts, body), cancel)
}

/// 413 when the body hit the size limit, 400 for any other read failure.
fn body_error_status(error: &axum::Error) -> StatusCode {
    let mut current = error.source();
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        current = err.source();
    }
    StatusCode::BAD_REQUEST
}

fn body_error_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "request body too large",
        _ => "invalid request body",
    }
}
