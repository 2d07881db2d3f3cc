//! Raw bytes and plain text.

use std::fmt;

use axum::http::HeaderValue;
use bytes::Bytes;

use super::{write_content_type, Render, PLAIN_CONTENT_TYPE};
use crate::error::Error;
use crate::http::ResponseWriter;

/// Raw chunks written back to back under a caller-chosen content type.
#[derive(Debug, Clone)]
pub struct Data {
    pub content_type: String,
    pub chunks: Vec<Bytes>,
}

impl Render for Data {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        match HeaderValue::from_str(&self.content_type) {
            Ok(value) => write_content_type(w, value),
            Err(_) => tracing::warn!(content_type = %self.content_type, "invalid content type skipped"),
        }
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        for chunk in &self.chunks {
            w.write_body(chunk)?;
        }
        Ok(())
    }
}

/// A preformatted `text/plain` body.
#[derive(Debug, Clone)]
pub struct Text(pub String);

impl Text {
    pub fn new(body: impl fmt::Display) -> Self {
        Self(body.to_string())
    }
}

impl Render for Text {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        write_content_type(w, HeaderValue::from_static(PLAIN_CONTENT_TYPE));
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        w.write_body(self.0.as_bytes())?;
        Ok(())
    }
}
