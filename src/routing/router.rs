//! Route lookup.
//!
//! # Responsibilities
//! - Store registered routes with their handler chains
//! - Look up the matching route for a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Built before serving, immutable while serving (shared without locks)
//! - O(n) scan in registration order; first match wins
//! - Explicit `None` rather than a silent default route

use axum::http::{Method, Request};
use bytes::Bytes;

use super::matcher::{Matcher, MethodMatcher, PathPattern};
use crate::context::{HandlerFunc, Param};

/// A registered route.
struct Route {
    matcher: Box<dyn Matcher>,
    pattern: PathPattern,
    handlers: Vec<HandlerFunc>,
}

/// Outcome of a successful lookup.
pub struct RouteMatch<'a> {
    /// The pattern the route was registered with.
    pub path: &'a str,
    pub params: Vec<Param>,
    pub handlers: &'a [HandlerFunc],
}

/// Method + path route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handlers` for `method` requests matching `pattern`.
    pub fn add(&mut self, method: Method, pattern: &str, handlers: Vec<HandlerFunc>) {
        tracing::debug!(%method, pattern, handlers = handlers.len(), "route registered");
        self.routes.push(Route {
            matcher: Box::new(MethodMatcher::new(method)),
            pattern: PathPattern::new(pattern),
            handlers,
        });
    }

    /// Find the first route matching `req`.
    pub fn match_request(&self, req: &Request<Bytes>) -> Option<RouteMatch<'_>> {
        let path = req.uri().path();
        self.routes.iter().find_map(|route| {
            if !route.matcher.matches(req) {
                return None;
            }
            route.pattern.capture(path).map(|params| RouteMatch {
                path: route.pattern.as_str(),
                params,
                handlers: &route.handlers,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("matcher", &self.matcher)
            .field("pattern", &self.pattern)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl std::fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
