//! Response rendering helpers.
//!
//! Every envelope helper resolves the recorded error into a business code,
//! writes that code to the status code header, and answers HTTP 200. The
//! business code carries the real outcome.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;
use prost::{Message, Name};
use prost_types::Any;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::Context;
use crate::ecode::Ecode;
use crate::error::Error;
use crate::render::{
    body_allowed_for_status, js_escape, protobuf, Data, Json, MapJson, PbEnvelope, Redirect,
    Render, Text, Xml,
};

impl Context {
    /// Write the status line now. Later status writes are no-ops.
    pub fn status(&mut self, code: u16) {
        self.writer.write_header(code);
    }

    /// Render with strategy `r`, writing `code` first when given.
    ///
    /// No body is written for 1xx, 204 and 304. A non-empty `callback` form
    /// value wraps the body as `callback(body)`.
    pub fn render<R: Render>(&mut self, code: Option<u16>, r: R) {
        r.write_content_type(&mut self.writer);
        if let Some(code) = code {
            self.status(code);
        }
        if !body_allowed_for_status(code) {
            return;
        }

        let callback = self
            .form_value("callback")
            .map(|cb| js_escape(&cb))
            .unwrap_or_default();
        let jsonp = !callback.is_empty();
        if jsonp {
            if let Err(err) = self
                .writer
                .write_body(callback.as_bytes())
                .and_then(|_| self.writer.write_body(b"("))
            {
                self.error = Some(err.into());
                return;
            }
        }

        if let Err(err) = r.render(&mut self.writer) {
            self.error = Some(err);
            return;
        }

        if jsonp {
            if let Err(err) = self.writer.write_body(b")") {
                self.error = Some(err.into());
            }
        }
    }

    /// Serialize `data` inside the `{code, message, data}` envelope.
    ///
    /// `data` is left out when it serializes to null, e.g. `ctx.json((), err)`.
    ///
    /// A business message containing the legacy separator (`"4001||Invalid
    /// input"`) switches to the `{ret, code, message, now, data}` map.
    pub fn json<T: Serialize>(&mut self, data: T, err: Option<Error>) {
        let bcode = self.cause(err.as_ref());
        self.error = err;
        self.write_bcode(&bcode);

        let settings = Arc::clone(&self.settings);
        let parts: Vec<&str> = bcode
            .message()
            .split(settings.legacy_separator.as_str())
            .collect();
        if parts.len() > 1 {
            let data = match serde_json::to_value(&data) {
                Ok(data) => data,
                Err(err) => {
                    self.error = Some(err.into());
                    return;
                }
            };
            let mut out = Map::new();
            out.insert("ret".into(), json!(bcode.code()));
            out.insert("message".into(), json!(parts[1]));
            out.insert("code".into(), json!(parts[0]));
            out.insert("now".into(), json!(chrono::Utc::now().timestamp()));
            out.insert("data".into(), data);
            self.render(Some(StatusCode::OK.as_u16()), MapJson(out));
        } else {
            self.render(
                Some(StatusCode::OK.as_u16()),
                Json {
                    code: bcode.code(),
                    message: bcode.message().to_string(),
                    data: present(data),
                },
            );
        }
    }

    /// Serialize a caller-built map, adding `code` and a default `message`.
    pub fn json_map(&mut self, mut data: Map<String, serde_json::Value>, err: Option<Error>) {
        let bcode = self.cause(err.as_ref());
        self.error = err;
        self.write_bcode(&bcode);
        data.insert("code".into(), json!(bcode.code()));
        if !data.contains_key("message") {
            data.insert("message".into(), json!(bcode.message()));
        }
        self.render(Some(StatusCode::OK.as_u16()), MapJson(data));
    }

    /// Serialize `data` inside the XML envelope.
    pub fn xml<T: Serialize>(&mut self, data: T, err: Option<Error>) {
        let bcode = self.cause(err.as_ref());
        self.error = err;
        self.write_bcode(&bcode);
        self.render(
            Some(StatusCode::OK.as_u16()),
            Xml {
                code: bcode.code(),
                message: bcode.message().to_string(),
                data: present(data),
            },
        );
    }

    /// Pack `data` into an `Any` and render the protobuf envelope.
    ///
    /// If `data` cannot be marshalled nothing is written and the failure is
    /// recorded.
    pub fn protobuf<M>(&mut self, data: Option<&M>, err: Option<Error>)
    where
        M: Message + Name,
    {
        let bcode = self.cause(err.as_ref());
        self.error = err;

        let any = match data {
            Some(data) => match protobuf::pack(data, self.writer.remaining()) {
                Ok(any) => any,
                Err(err) => {
                    tracing::debug!(error = %err, type_name = %M::full_name(), "protobuf marshal failed");
                    self.error = Some(err.into());
                    return;
                }
            },
            None => Any::default(),
        };
        self.write_bcode(&bcode);
        self.render(
            Some(StatusCode::OK.as_u16()),
            PbEnvelope {
                code: i64::from(bcode.code()),
                message: bcode.message().to_string(),
                data: Some(any),
            },
        );
    }

    /// Write raw chunks with the given status and content type.
    pub fn bytes<I, B>(&mut self, code: u16, content_type: &str, data: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.render(
            Some(code),
            Data {
                content_type: content_type.to_string(),
                chunks: data.into_iter().map(Into::into).collect(),
            },
        );
    }

    /// Write a `text/plain` body, e.g. `ctx.string(200, format_args!("hi {name}"))`.
    pub fn string(&mut self, code: u16, body: impl fmt::Display) {
        self.render(Some(code), Text::new(body));
    }

    /// Redirect to `location`.
    pub fn redirect(&mut self, code: u16, location: impl Into<String>) {
        let redirect = Redirect {
            code,
            location: location.into(),
            method: self.request.method().clone(),
            request_path: self.request.uri().path().to_string(),
        };
        self.render(None, redirect);
    }

    fn cause(&self, err: Option<&Error>) -> Ecode {
        self.settings.resolver.cause(err)
    }

    pub(crate) fn write_bcode(&mut self, bcode: &Ecode) {
        let header = self.settings.status_code_header.clone();
        self.writer
            .headers_mut()
            .insert(header, HeaderValue::from(bcode.code()));
    }
}

/// `None` for payloads that serialize to null.
fn present<T: Serialize>(data: T) -> Option<T> {
    match serde_json::to_value(&data) {
        Ok(Value::Null) => None,
        _ => Some(data),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::{header, Method, Request};
    use serde_json::Value;

    use super::*;
    use crate::context::Settings;
    use crate::ecode::{CatalogResolver, NOT_FOUND, SERVER_ERR};
    use crate::render::protobuf::tests::Ping;

    fn context(uri: &str) -> Context {
        Context::new(Request::builder().uri(uri).body(Bytes::new()).unwrap())
    }

    fn body_json(ctx: &Context) -> Value {
        serde_json::from_slice(ctx.writer().body()).unwrap()
    }

    fn bcode_header(ctx: &Context) -> &str {
        ctx.writer().headers()["kratos-status-code"].to_str().unwrap()
    }

    #[test]
    fn test_json_success_envelope() {
        let mut ctx = context("/");
        ctx.json(json!({"id": 1}), None);

        assert_eq!(ctx.writer().body(), br#"{"code":0,"message":"OK","data":{"id":1}}"#);
        assert_eq!(bcode_header(&ctx), "0");
        assert_eq!(ctx.writer().status(), StatusCode::OK);
        assert_eq!(
            ctx.writer().headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert!(ctx.error().is_none());
    }

    #[test]
    fn test_json_error_still_http_200() {
        let mut ctx = context("/");
        ctx.json(Value::Null, Some(NOT_FOUND.into()));

        let body = body_json(&ctx);
        assert_eq!(body["code"], -404);
        assert_eq!(body["message"], "Not Found");
        assert_eq!(bcode_header(&ctx), "-404");
        assert_eq!(ctx.writer().status(), StatusCode::OK);
        assert!(matches!(ctx.error(), Some(Error::Code(c)) if c.code() == -404));
    }

    #[test]
    fn test_json_error_omits_null_data() {
        let mut ctx = context("/");
        ctx.json((), Some(NOT_FOUND.into()));
        assert_eq!(ctx.writer().body(), br#"{"code":-404,"message":"Not Found"}"#);

        let mut ctx = context("/");
        ctx.json(Option::<i32>::None, None);
        assert_eq!(ctx.writer().body(), br#"{"code":0,"message":"OK"}"#);
    }

    #[test]
    fn test_xml_error_omits_data() {
        let mut ctx = context("/");
        ctx.xml((), Some(NOT_FOUND.into()));
        let body = std::str::from_utf8(ctx.writer().body()).unwrap();
        assert!(body.contains("<code>-404</code>"));
        assert!(!body.contains("<data"));
    }

    #[test]
    fn test_json_legacy_map() {
        let mut ctx = context("/");
        ctx.json(json!([1, 2]), Some(Ecode::with_message(-4001, "4001||Invalid input").into()));

        let body = body_json(&ctx);
        assert_eq!(body["ret"], -4001);
        assert_eq!(body["code"], "4001");
        assert_eq!(body["message"], "Invalid input");
        assert!(body["now"].as_i64().unwrap() > 0);
        assert_eq!(body["data"], json!([1, 2]));
        assert_eq!(bcode_header(&ctx), "-4001");
    }

    #[test]
    fn test_json_legacy_from_catalog() {
        let settings = Settings {
            resolver: Arc::new(CatalogResolver::new(HashMap::from([(
                0,
                "200||success".to_string(),
            )]))),
            ..Settings::default()
        };
        let mut ctx = Context::with_settings(Request::new(Bytes::new()), Arc::new(settings));
        ctx.json("ok", None);

        let body = body_json(&ctx);
        assert_eq!(body["ret"], 0);
        assert_eq!(body["code"], "200");
        assert_eq!(body["message"], "success");
    }

    #[test]
    fn test_unknown_error_resolves_to_server_error() {
        let mut ctx = context("/");
        ctx.json((), Some(Error::app("db unavailable")));
        assert_eq!(body_json(&ctx)["code"], SERVER_ERR.code());
        assert!(matches!(ctx.error(), Some(Error::App(_))));
    }

    #[test]
    fn test_json_map_keeps_caller_message() {
        let mut ctx = context("/");
        let mut data = Map::new();
        data.insert("message".into(), json!("custom"));
        data.insert("items".into(), json!([]));
        ctx.json_map(data, Some(NOT_FOUND.into()));

        let body = body_json(&ctx);
        assert_eq!(body["code"], -404);
        assert_eq!(body["message"], "custom");
        assert_eq!(body["items"], json!([]));

        let mut ctx = context("/");
        ctx.json_map(Map::new(), None);
        assert_eq!(body_json(&ctx)["message"], "OK");
    }

    #[test]
    fn test_xml_envelope() {
        let mut ctx = context("/");
        ctx.xml("pen", None);
        let body = std::str::from_utf8(ctx.writer().body()).unwrap();
        assert!(body.contains("<code>0</code>"));
        assert!(body.contains("<data>pen</data>"));
        assert_eq!(bcode_header(&ctx), "0");
    }

    #[test]
    fn test_protobuf_envelope() {
        let mut ctx = context("/");
        ctx.protobuf(Some(&Ping { text: "pong".into() }), None);

        let envelope = PbEnvelope::decode(ctx.writer().body()).unwrap();
        assert_eq!(envelope.code, 0);
        let any = envelope.data.unwrap();
        assert_eq!(any.type_url, "type.googleapis.com/demo.v1.Ping");
        assert_eq!(Ping::decode(any.value.as_slice()).unwrap().text, "pong");
        assert_eq!(
            ctx.writer().headers()[header::CONTENT_TYPE],
            "application/x-protobuf"
        );
    }

    #[test]
    fn test_protobuf_marshal_failure_writes_nothing() {
        let settings = Settings {
            max_response_body_bytes: 4,
            ..Settings::default()
        };
        let mut ctx = Context::with_settings(Request::new(Bytes::new()), Arc::new(settings));
        ctx.protobuf(Some(&Ping { text: "far too long".into() }), None);

        assert!(matches!(ctx.error(), Some(Error::Protobuf(_))));
        assert!(!ctx.writer().is_committed());
        assert!(ctx.writer().body().is_empty());
        assert!(!ctx.writer().headers().contains_key("kratos-status-code"));
    }

    #[test]
    fn test_render_no_body_statuses() {
        for code in [101, 204, 304] {
            let mut ctx = context("/?callback=foo");
            ctx.render(Some(code), Text::new("ignored"));
            assert!(ctx.writer().body().is_empty(), "status {code}");
            assert_eq!(ctx.writer().status().as_u16(), code);
        }
    }

    #[test]
    fn test_jsonp_wrapping() {
        let mut ctx = context("/?callback=foo");
        let mut map = Map::new();
        map.insert("a".into(), json!(1));
        ctx.render(Some(200), MapJson(map));
        assert_eq!(ctx.writer().body(), br#"foo({"a":1})"#);
    }

    #[test]
    fn test_jsonp_callback_escaped() {
        let mut ctx = context("/?callback=%3Cscript%3E");
        ctx.string(200, "x");
        assert_eq!(ctx.writer().body(), b"\\u003Cscript\\u003E(x)");
    }

    #[test]
    fn test_render_write_failure_recorded() {
        let settings = Settings {
            max_response_body_bytes: 8,
            ..Settings::default()
        };
        let mut ctx = Context::with_settings(Request::new(Bytes::new()), Arc::new(settings));
        ctx.string(200, "this body is too long");
        assert!(matches!(ctx.error(), Some(Error::Write(_))));
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn test_bytes_and_string() {
        let mut ctx = context("/");
        ctx.bytes(201, "application/octet-stream", [&b"ab"[..], &b"cd"[..]]);
        assert_eq!(ctx.writer().status(), StatusCode::CREATED);
        assert_eq!(ctx.writer().body(), b"abcd");

        let mut ctx = context("/");
        let name = "ada";
        ctx.string(202, format_args!("hello {name}"));
        assert_eq!(ctx.writer().body(), b"hello ada");
        assert_eq!(ctx.writer().status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_redirect() {
        let mut ctx = Context::new(
            Request::builder()
                .method(Method::POST)
                .uri("/a/b")
                .body(Bytes::new())
                .unwrap(),
        );
        ctx.redirect(307, "c");
        assert_eq!(ctx.writer().status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(ctx.writer().headers()[header::LOCATION], "/a/c");

        let mut ctx = context("/");
        ctx.redirect(200, "/nope");
        assert!(matches!(ctx.error(), Some(Error::InvalidRedirect(200))));
    }

    #[test]
    fn test_status_written_once() {
        let mut ctx = context("/");
        ctx.status(404);
        ctx.json((), None);
        assert_eq!(ctx.writer().status(), StatusCode::NOT_FOUND);
    }
}
