//! JSON envelopes.

use axum::http::HeaderValue;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{write_content_type, Render, JSON_CONTENT_TYPE};
use crate::error::Error;
use crate::http::ResponseWriter;

/// The `{code, message, data}` envelope.
///
/// `data` is omitted when `None`.
#[derive(Debug, Serialize)]
pub struct Json<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Render for Json<T> {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        write_content_type(w, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        let body = serde_json::to_vec(self)?;
        w.write_body(&body)?;
        Ok(())
    }
}

/// A free-form JSON object.
#[derive(Debug, Default)]
pub struct MapJson(pub Map<String, Value>);

impl Render for MapJson {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        write_content_type(w, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        let body = serde_json::to_vec(&self.0)?;
        w.write_body(&body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let mut w = ResponseWriter::default();
        let r = Json {
            code: 0,
            message: "OK".into(),
            data: Some(json!({"id": 7})),
        };
        r.write_content_type(&mut w);
        r.render(&mut w).unwrap();
        assert_eq!(w.body(), br#"{"code":0,"message":"OK","data":{"id":7}}"#);
    }

    #[test]
    fn test_missing_data_omitted() {
        let mut w = ResponseWriter::default();
        Json::<()> {
            code: -400,
            message: "bad".into(),
            data: None,
        }
        .render(&mut w)
        .unwrap();
        assert_eq!(w.body(), br#"{"code":-400,"message":"bad"}"#);
    }
}
