//! Response render strategies.
//!
//! # Responsibilities
//! - Set the response content type (without overriding one already set)
//! - Encode a body into the [`ResponseWriter`]
//! - Decide which statuses may carry a body
//! - Escape JSONP callback names
//!
//! # Design Decisions
//! - Strategies are plain values implementing [`Render`]; the context
//!   owns status handling and JSONP wrapping
//! - Bodies are fully encoded before the first byte is written, so an
//!   encode failure never leaves a partial body behind

pub mod data;
pub mod json;
pub mod protobuf;
pub mod redirect;
pub mod xml;

pub use data::{Data, Text};
pub use json::{Json, MapJson};
pub use protobuf::{PbEnvelope, TYPE_URL_PREFIX};
pub use redirect::Redirect;
pub use xml::Xml;

use axum::http::{header, HeaderValue};

use crate::error::Error;
use crate::http::ResponseWriter;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
pub const PLAIN_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A body encoder.
pub trait Render {
    /// Set `Content-Type` unless the handler already chose one.
    fn write_content_type(&self, w: &mut ResponseWriter);

    /// Encode the body into the writer.
    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error>;
}

pub(crate) fn write_content_type(w: &mut ResponseWriter, value: HeaderValue) {
    if !w.headers().contains_key(header::CONTENT_TYPE) {
        w.headers_mut().insert(header::CONTENT_TYPE, value);
    }
}

/// Whether a response with this status may carry a body.
///
/// `None` means no status is written by the caller.
pub fn body_allowed_for_status(status: Option<u16>) -> bool {
    !matches!(status, Some(100..=199 | 204 | 304))
}

/// Escape a string for embedding in JavaScript source.
pub fn js_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '=' => out.push_str("\\u003D"),
            c if c.is_control() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_allowed() {
        assert!(body_allowed_for_status(None));
        assert!(body_allowed_for_status(Some(200)));
        assert!(body_allowed_for_status(Some(404)));
        assert!(!body_allowed_for_status(Some(101)));
        assert!(!body_allowed_for_status(Some(204)));
        assert!(!body_allowed_for_status(Some(304)));
    }

    #[test]
    fn test_js_escape() {
        assert_eq!(js_escape("foo"), "foo");
        assert_eq!(js_escape("jQuery_123.cb"), "jQuery_123.cb");
        assert_eq!(js_escape("a<b>&'\"="), "a\\u003Cb\\u003E\\u0026\\'\\\"\\u003D");
        assert_eq!(js_escape("x\ny"), "x\\u000Ay");
    }

    #[test]
    fn test_content_type_not_overridden() {
        let mut w = ResponseWriter::default();
        write_content_type(&mut w, HeaderValue::from_static(PLAIN_CONTENT_TYPE));
        write_content_type(&mut w, HeaderValue::from_static(JSON_CONTENT_TYPE));
        assert_eq!(w.headers()[header::CONTENT_TYPE], PLAIN_CONTENT_TYPE);
    }
}
