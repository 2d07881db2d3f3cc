//! Request inspection helpers.
//!
//! # Responsibilities
//! - Carry out-of-band request metadata (client IP set upstream)
//! - Look up form values from the query string and urlencoded bodies
//! - Extract the media type from `Content-Type`
//!
//! # Design Decisions
//! - Requests reach handlers with their body fully buffered, so form
//!   parsing is a pure function of the request
//! - Body form values shadow query values of the same name

use axum::http::{header, Method, Request};
use bytes::Bytes;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Client IP recorded by upstream middleware.
///
/// Stored in the request extensions; takes precedence over forwarding
/// headers when resolving the remote address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIp(pub String);

/// Media type of the request body, without parameters, lowercased.
pub fn media_type<B>(req: &Request<B>) -> String {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// First value of form field `name`.
pub fn form_value(req: &Request<Bytes>, name: &str) -> Option<String> {
    if has_form_body(req) {
        if let Some(value) = lookup(req.body(), name) {
            return Some(value);
        }
    }
    req.uri()
        .query()
        .and_then(|query| lookup(query.as_bytes(), name))
}

fn has_form_body(req: &Request<Bytes>) -> bool {
    matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH)
        && media_type(req) == "application/x-www-form-urlencoded"
}

fn lookup(input: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
