//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request method
//! - Match a path pattern and capture its parameters
//!
//! # Design Decisions
//! - Path matching is case-sensitive and segment based
//! - `:name` captures one segment, `*name` captures the rest of the path
//! - No regex, so matching is linear in the number of segments
//! - Segments are split before percent-decoding, so `%2F` never adds a segment

use std::borrow::Cow;

use axum::http::{Method, Request};
use bytes::Bytes;
use percent_encoding::percent_decode_str;

use crate::context::Param;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Bytes>) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Bytes>) -> bool {
        *req.method() == self.method
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A compiled path pattern such as `/users/:id/files/*path`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = split(&raw)
            .map(|s| {
                if let Some(name) = s.strip_prefix(':') {
                    Segment::Param(name.to_string())
                } else if let Some(name) = s.strip_prefix('*') {
                    Segment::CatchAll(name.to_string())
                } else {
                    Segment::Static(s.to_string())
                }
            })
            .collect();
        Self { raw, segments }
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters if `path` matches. Values are percent-decoded.
    pub fn capture(&self, path: &str) -> Option<Vec<Param>> {
        let mut params = Vec::new();
        let mut parts = split(path).map(decode);
        for segment in &self.segments {
            match segment {
                Segment::CatchAll(name) => {
                    let rest: Vec<Cow<'_, str>> = parts.collect();
                    params.push(Param::new(name.as_str(), format!("/{}", rest.join("/"))));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.next()? != expected.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.next()?;
                    params.push(Param::new(name.as_str(), value.into_owned()));
                }
            }
        }
        match parts.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}
