//! Per-request context.
//!
//! # Data Flow
//! ```text
//! Engine::serve
//!     → ContextPool::acquire (checked-out, clean context)
//!     → prepare (request, writer, route, handlers, cancellation)
//!     → next() runs the handler chain
//!         → handlers read params/keys, bind bodies, render responses
//!     → take_response
//!     → PooledContext drop (reset, checked back in)
//! ```
//!
//! # Design Decisions
//! - One thread drives the dispatch loop; only the key/value store is
//!   shared with tasks spawned by handlers. Mutating any other field from
//!   another task is the caller's responsibility
//! - Errors are recorded on the context, never returned through `next()`
//! - `reset` clears everything reachable from the previous request and is
//!   run by the pool on every check-in

mod bind;
mod flow;
mod keys;
mod params;
mod pool;
mod remote_ip;
mod response;

pub use flow::{handler, Dispatch, HandlerFunc};
pub use keys::{Keys, Value};
pub use params::{Param, Params};
pub use pool::{ContextPool, PooledContext};

use std::sync::Arc;

use axum::http::{HeaderName, Method, Request};
use axum::response::Response;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::binding::{DefaultTranslator, Translator};
use crate::ecode::{CatalogResolver, CodeResolver};
use crate::error::Error;
use crate::http::ResponseWriter;

pub const DEFAULT_STATUS_CODE_HEADER: &str = "kratos-status-code";
pub const DEFAULT_LEGACY_SEPARATOR: &str = "||";
pub const DEFAULT_MAX_RESPONSE_BODY: usize = 4 * 1024 * 1024;

/// Engine-wide settings a context renders with.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maps recorded errors to business codes.
    pub resolver: Arc<dyn CodeResolver>,
    /// Renders validation failures from `bind`.
    pub translator: Arc<dyn Translator>,
    /// Header carrying the business code.
    pub status_code_header: HeaderName,
    /// Splits a business message into the legacy `code`/`message` pair.
    pub legacy_separator: String,
    pub max_response_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolver: Arc::new(CatalogResolver::default()),
            translator: Arc::new(DefaultTranslator),
            status_code_header: HeaderName::from_static(DEFAULT_STATUS_CODE_HEADER),
            legacy_separator: DEFAULT_LEGACY_SEPARATOR.to_string(),
            max_response_body_bytes: DEFAULT_MAX_RESPONSE_BODY,
        }
    }
}

/// State for one in-flight request.
pub struct Context {
    cancel: Option<CancellationToken>,

    request: Request<Bytes>,
    writer: ResponseWriter,

    // flow control
    index: Option<usize>,
    dispatch: Dispatch,
    handlers: Vec<HandlerFunc>,

    keys: Arc<Keys>,

    error: Option<Error>,
    error_msg: String,

    method: Option<Method>,
    route_path: String,
    params: Params,

    settings: Arc<Settings>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.method)
            .field("uri", self.request.uri())
            .field("route_path", &self.route_path)
            .field("params", &self.params)
            .field("index", &self.index)
            .field("dispatch", &self.dispatch)
            .field("handlers", &self.handlers.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cancel: None,
            request: Request::default(),
            writer: ResponseWriter::default(),
            index: None,
            dispatch: Dispatch::Continue,
            handlers: Vec::new(),
            keys: Arc::default(),
            error: None,
            error_msg: String::new(),
            method: None,
            route_path: String::new(),
            params: Params::default(),
            settings: Arc::default(),
        }
    }
}

impl Context {
    /// A standalone context for `request` with default settings.
    pub fn new(request: Request<Bytes>) -> Self {
        Self::with_settings(request, Arc::default())
    }

    pub fn with_settings(request: Request<Bytes>, settings: Arc<Settings>) -> Self {
        let mut ctx = Self::default();
        ctx.prepare(request, settings, CancellationToken::new());
        ctx
    }

    /// Attach a fresh request to a clean context.
    pub(crate) fn prepare(
        &mut self,
        request: Request<Bytes>,
        settings: Arc<Settings>,
        cancel: CancellationToken,
    ) {
        self.method = Some(request.method().clone());
        self.request = request;
        self.writer = ResponseWriter::new(settings.max_response_body_bytes);
        self.settings = settings;
        self.cancel = Some(cancel);
    }

    /// Clear every per-request field.
    ///
    /// Route params keep their allocation for the next request.
    pub fn reset(&mut self) {
        self.cancel = None;
        self.request = Request::default();
        self.writer = ResponseWriter::default();
        self.index = None;
        self.dispatch = Dispatch::Continue;
        self.handlers.clear();
        match Arc::get_mut(&mut self.keys) {
            Some(keys) => keys.clear(),
            // a spawned task still holds the old store
            None => self.keys = Arc::default(),
        }
        self.error = None;
        self.error_msg.clear();
        self.method = None;
        self.route_path.clear();
        self.params.clear();
    }

    /// Replace the handler chain.
    pub fn set_handlers(&mut self, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.handlers.clear();
        self.handlers.extend(handlers);
    }

    /// Record the matched route.
    pub fn set_route(&mut self, path: &str, params: impl IntoIterator<Item = Param>) {
        self.route_path.clear();
        self.route_path.push_str(path);
        self.params.clear();
        self.params.extend(params);
    }

    /// The per-request cancellable execution context.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Bytes> {
        &mut self.request
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    /// Move the written response out, leaving an empty writer behind.
    pub fn take_response(&mut self) -> Response {
        std::mem::take(&mut self.writer).into_response()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value of the route parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// First value of form field `name` (urlencoded body, then query string).
    pub fn form_value(&self, name: &str) -> Option<String> {
        crate::http::request::form_value(&self.request, name)
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, err: impl Into<Error>) {
        self.error = Some(err.into());
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Raw text of the last binding failure.
    pub fn error_msg(&self) -> &str {
        &self.error_msg
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }
}
