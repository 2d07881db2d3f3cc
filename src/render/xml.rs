//! XML envelope.

use axum::http::HeaderValue;
use serde::Serialize;

use super::{write_content_type, Render, XML_CONTENT_TYPE};
use crate::error::Error;
use crate::http::ResponseWriter;

/// The `{code, message, data}` envelope rooted at `<response>`.
#[derive(Debug, Serialize)]
#[serde(rename = "response")]
pub struct Xml<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Render for Xml<T> {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        write_content_type(w, HeaderValue::from_static(XML_CONTENT_TYPE));
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        let body = quick_xml::se::to_string(self)?;
        w.write_body(body.as_bytes())?;
        Ok(())
    }
}
