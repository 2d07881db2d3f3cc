//! HTTP redirects.

use axum::http::{header, HeaderValue, Method, StatusCode};
use url::Url;

use super::{write_content_type, Render, HTML_CONTENT_TYPE};
use crate::error::Error;
use crate::http::ResponseWriter;

/// Redirect to `location` with a 3xx (or 201) status.
#[derive(Debug, Clone)]
pub struct Redirect {
    pub code: u16,
    pub location: String,
    pub method: Method,
    /// Path of the current request, used to resolve relative locations.
    pub request_path: String,
}

impl Redirect {
    fn resolved_location(&self) -> String {
        if self.location.starts_with('/') || Url::parse(&self.location).is_ok() {
            return self.location.clone();
        }
        let joined = Url::parse("http://localhost/")
            .and_then(|base| base.join(&self.request_path))
            .and_then(|base| base.join(&self.location));
        match joined {
            Ok(url) => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
            Err(_) => self.location.clone(),
        }
    }
}

impl Render for Redirect {
    fn write_content_type(&self, _w: &mut ResponseWriter) {}

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        if !(300..=308).contains(&self.code) && self.code != 201 {
            return Err(Error::InvalidRedirect(self.code));
        }
        let location = self.resolved_location();
        let value = HeaderValue::from_str(&location)
            .map_err(|e| Error::app(format!("invalid redirect location {location:?}: {e}")))?;
        w.headers_mut().insert(header::LOCATION, value);

        let is_get = self.method == Method::GET;
        if is_get || self.method == Method::HEAD {
            write_content_type(w, HeaderValue::from_static(HTML_CONTENT_TYPE));
        }
        w.write_header(self.code);

        if is_get {
            let reason = StatusCode::from_u16(self.code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Redirect");
            let body = format!("<a href=\"{}\">{}</a>.\n", html_escape(&location), reason);
            w.write_body(body.as_bytes())?;
        }
        Ok(())
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
