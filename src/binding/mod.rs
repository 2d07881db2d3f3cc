//! Request body binding and validation.
//!
//! # Responsibilities
//! - Select a decoder from the request method and `Content-Type`
//! - Decode the buffered body (or query string) into a typed value
//! - Run field validation on the decoded value
//! - Translate validation failures into human-readable messages
//!
//! # Design Decisions
//! - `GET` always binds from the query string
//! - Unrecognised content types are an error, not a silent form fallback
//! - Validation errors are kept structured so a [`Translator`] can render them

pub mod translate;

pub use translate::{DefaultTranslator, Translator};

use axum::http::{Method, Request};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::http::request::media_type;

pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "application/xml";
pub const MIME_XML2: &str = "text/xml";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Errors produced while binding a request.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),

    #[error("json decode: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml decode: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("form decode: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// A decoding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Json,
    Xml,
    /// `application/x-www-form-urlencoded` body.
    Form,
    /// URL query string.
    Query,
}

impl Binding {
    /// Pick a binding for a request.
    pub fn default_for(method: &Method, content_type: &str) -> Result<Self, BindError> {
        if method == Method::GET {
            return Ok(Binding::Query);
        }
        let media = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match media.as_str() {
            MIME_JSON => Ok(Binding::Json),
            MIME_XML | MIME_XML2 => Ok(Binding::Xml),
            MIME_FORM => Ok(Binding::Form),
            _ => Err(BindError::UnsupportedContentType(media)),
        }
    }

    /// Select the binding for `req`.
    pub fn for_request(req: &Request<Bytes>) -> Result<Self, BindError> {
        Self::default_for(req.method(), &media_type(req))
    }

    /// Decode and validate.
    pub fn bind<T>(&self, req: &Request<Bytes>) -> Result<T, BindError>
    where
        T: DeserializeOwned + Validate,
    {
        let value: T = match self {
            Binding::Json => serde_json::from_slice(req.body())?,
            Binding::Xml => quick_xml::de::from_reader(req.body().as_ref())?,
            Binding::Form => serde_urlencoded::from_bytes(req.body())?,
            Binding::Query => serde_urlencoded::from_str(req.uri().query().unwrap_or_default())?,
        };
        value.validate()?;
        Ok(value)
    }
}
