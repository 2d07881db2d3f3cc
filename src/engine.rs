//! Request dispatch engine.
//!
//! # Data Flow
//! ```text
//! Request<Bytes> + cancellation token
//!     → trusted proxy header copied into RemoteIp metadata
//!     → router lookup (handlers, route path, params) or not-found chain
//!     → pooled context prepared with current Settings
//!     → next() runs middleware then route handlers
//!     → errors logged, metrics recorded
//!     → Response; context reset and checked back in
//! ```
//!
//! # Design Decisions
//! - Routes and middleware are registered before the engine is shared;
//!   serving takes `&self` only
//! - Settings are swapped atomically on config reload; a request renders
//!   with the settings current when it was checked out

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::config::validation::ValidationError;
use crate::config::{build_settings, ConfigError, ServerConfig};
use crate::context::{handler, ContextPool, HandlerFunc, Settings};
use crate::http::request::RemoteIp;
use crate::observability::metrics;
use crate::routing::Router;

const NOT_FOUND_BODY: &str = "404 page not found";

/// Owns middleware, routes, settings and the context pool.
pub struct Engine {
    settings: ArcSwap<Settings>,
    middleware: Vec<HandlerFunc>,
    router: Router,
    pool: ContextPool,
    not_found: HandlerFunc,
    trusted_ip_header: Option<HeaderName>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("middleware", &self.middleware.len())
            .field("router", &self.router)
            .field("pool", &self.pool)
            .field("trusted_ip_header", &self.trusted_ip_header)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
            middleware: Vec::new(),
            router: Router::new(),
            pool: ContextPool::default(),
            not_found: handler(|ctx| ctx.string(StatusCode::NOT_FOUND.as_u16(), NOT_FOUND_BODY)),
            trusted_ip_header: None,
        }
    }

    /// Build an engine from a validated configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let mut engine = Self::new(build_settings(config)?);
        if let Some(name) = &config.proxy.trusted_ip_header {
            let name = HeaderName::try_from(name.as_str()).map_err(|e| {
                ConfigError::Validation(vec![ValidationError {
                    field: "proxy.trusted_ip_header".into(),
                    message: e.to_string(),
                }])
            })?;
            engine.trusted_ip_header = Some(name);
        }
        Ok(engine)
    }

    /// Append global middleware, run before every route's handlers.
    pub fn use_middleware(&mut self, middleware: HandlerFunc) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Copy this header into the request's client IP metadata.
    pub fn trust_ip_header(&mut self, name: HeaderName) -> &mut Self {
        self.trusted_ip_header = Some(name);
        self
    }

    /// Register a route.
    pub fn handle(
        &mut self,
        method: Method,
        path: &str,
        handlers: impl IntoIterator<Item = HandlerFunc>,
    ) -> &mut Self {
        self.router.add(method, path, handlers.into_iter().collect());
        self
    }

    pub fn get(&mut self, path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) -> &mut Self {
        self.handle(Method::GET, path, handlers)
    }

    pub fn post(&mut self, path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) -> &mut Self {
        self.handle(Method::POST, path, handlers)
    }

    pub fn put(&mut self, path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) -> &mut Self {
        self.handle(Method::PUT, path, handlers)
    }

    pub fn delete(&mut self, path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) -> &mut Self {
        self.handle(Method::DELETE, path, handlers)
    }

    /// The settings new requests render with.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    /// Swap the rendering settings. In-flight requests keep their copy.
    pub fn update_settings(&self, settings: Settings) {
        self.settings.store(Arc::new(settings));
        tracing::info!("response settings updated");
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    /// Dispatch one buffered request.
    pub fn serve(&self, mut request: Request<Bytes>, cancel: CancellationToken) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        self.copy_trusted_ip(&mut request);

        let mut ctx = self.pool.acquire();
        match self.router.match_request(&request) {
            Some(route) => {
                ctx.set_route(route.path, route.params);
                ctx.set_handlers(self.middleware.iter().chain(route.handlers).cloned());
            }
            None => {
                ctx.set_handlers(
                    self.middleware
                        .iter()
                        .chain(std::iter::once(&self.not_found))
                        .cloned(),
                );
            }
        }
        let settings = self.settings.load_full();
        ctx.prepare(request, Arc::clone(&settings), cancel);

        tracing::debug!(%method, %path, route = ctx.route_path(), "dispatching");
        ctx.next();

        let status = ctx.writer().status();
        let bcode = ctx
            .writer()
            .headers()
            .get(&settings.status_code_header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if let Some(error) = ctx.error() {
            tracing::warn!(
                %method,
                %path,
                status = status.as_u16(),
                %bcode,
                %error,
                error_msg = ctx.error_msg(),
                "request finished with error"
            );
        }
        tracing::debug!(
            %method,
            %path,
            status = status.as_u16(),
            %bcode,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request dispatched"
        );
        metrics::record_request(method.as_str(), status.as_u16(), &bcode, start);

        let response = ctx.take_response();
        drop(ctx);
        metrics::record_pool_idle(self.pool.idle());
        response
    }

    fn copy_trusted_ip(&self, request: &mut Request<Bytes>) {
        let Some(name) = &self.trusted_ip_header else {
            return;
        };
        if request.extensions().get::<RemoteIp>().is_some() {
            return;
        }
        let ip = request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());
        if let Some(ip) = ip.filter(|ip| !ip.is_empty()) {
            request.extensions_mut().insert(RemoteIp(ip));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use super::*;
    use crate::ecode::NOT_FOUND;

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    async fn body(response: Response) -> Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn test_route_with_params() {
        let mut engine = Engine::default();
        engine.get(
            "/users/:id",
            [handler(|ctx| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                let route = ctx.route_path().to_string();
                ctx.json(json!({"id": id, "route": route}), None);
            })],
        );

        let response = engine.serve(request(Method::GET, "/users/42"), CancellationToken::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["kratos-status-code"], "0");
        let body: Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(body["data"], json!({"id": "42", "route": "/users/:id"}));
    }

    #[tokio::test]
    async fn test_middleware_wraps_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = Engine::default();
        let outer = Arc::clone(&log);
        engine.use_middleware(handler(move |ctx| {
            outer.lock().unwrap().push("before");
            ctx.next();
            outer.lock().unwrap().push("after");
        }));
        let inner = Arc::clone(&log);
        engine.get(
            "/ping",
            [handler(move |ctx| {
                inner.lock().unwrap().push("handler");
                ctx.string(200, "pong");
            })],
        );

        let response = engine.serve(request(Method::GET, "/ping"), CancellationToken::new());
        assert_eq!(body(response).await, "pong");
        assert_eq!(*log.lock().unwrap(), vec!["before", "handler", "after"]);
    }

    #[tokio::test]
    async fn test_not_found_runs_middleware() {
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        let mut engine = Engine::default();
        engine.use_middleware(handler(move |_| *counter.lock().unwrap() += 1));

        let response = engine.serve(request(Method::GET, "/missing"), CancellationToken::new());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(response).await, NOT_FOUND_BODY);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_abort_in_middleware_skips_route() {
        let mut engine = Engine::default();
        engine.use_middleware(handler(|ctx| {
            if ctx.request().headers().get("authorization").is_none() {
                ctx.abort_with_status(401);
            }
        }));
        engine.get("/secret", [handler(|ctx| ctx.string(200, "secret"))]);

        let response = engine.serve(request(Method::GET, "/secret"), CancellationToken::new());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_contexts_are_reused_clean() {
        let mut engine = Engine::default();
        engine.get(
            "/count",
            [handler(|ctx| {
                let seen = ctx.get_int64("seen") + 1;
                ctx.set("seen", seen);
                ctx.json(seen, None);
            })],
        );

        for _ in 0..3 {
            let response = engine.serve(request(Method::GET, "/count"), CancellationToken::new());
            let body: Value = serde_json::from_slice(&body(response).await).unwrap();
            assert_eq!(body["data"], 1);
        }
        assert_eq!(engine.pool().idle(), 1);
    }

    #[tokio::test]
    async fn test_update_settings() {
        let mut engine = Engine::default();
        engine.get("/", [handler(|ctx| ctx.json((), Some(NOT_FOUND.into())))]);
        engine.update_settings(Settings {
            status_code_header: HeaderName::from_static("x-bcode"),
            ..Settings::default()
        });

        let response = engine.serve(request(Method::GET, "/"), CancellationToken::new());
        assert_eq!(response.headers()["x-bcode"], "-404");
        assert!(!response.headers().contains_key("kratos-status-code"));
    }

    #[tokio::test]
    async fn test_trusted_ip_header() {
        let mut engine = Engine::default();
        engine.trust_ip_header(HeaderName::from_static("x-client-ip"));
        engine.get("/ip", [handler(|ctx| {
            let ip = ctx.remote_ip();
            ctx.string(200, ip);
        })]);

        let mut req = request(Method::GET, "/ip");
        req.headers_mut().insert("x-client-ip", "203.0.113.9".parse().unwrap());
        req.headers_mut().insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        let response = engine.serve(req, CancellationToken::new());
        assert_eq!(body(response).await, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_cancellation_token_is_attached() {
        let mut engine = Engine::default();
        engine.get("/", [handler(|ctx| {
            let cancelled = ctx.cancellation().map(|t| t.is_cancelled()).unwrap_or(false);
            ctx.string(200, cancelled);
        })]);

        let token = CancellationToken::new();
        token.cancel();
        let response = engine.serve(request(Method::GET, "/"), token);
        assert_eq!(body(response).await, "true");
    }

    #[test]
    fn test_from_config() {
        let mut config = ServerConfig::default();
        config.proxy.trusted_ip_header = Some("x-client-ip".into());
        config.response.status_code_header = "x-bcode".into();
        let engine = Engine::from_config(&config).unwrap();
        assert_eq!(engine.settings().status_code_header, "x-bcode");
        assert_eq!(
            engine.trusted_ip_header.as_ref().map(HeaderName::as_str),
            Some("x-client-ip")
        );
    }
}
