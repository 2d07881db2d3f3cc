//! Buffered response writer.
//!
//! # Responsibilities
//! - Commit the status line exactly once
//! - Snapshot headers at commit time
//! - Buffer the body up to a configured limit
//!
//! # Design Decisions
//! - The first status written wins; later writes are no-ops, as on a wire
//!   where the status line has already been sent
//! - Header mutations after the commit are not sent
//! - Writing body bytes commits an implicit 200

use std::io;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::BytesMut;

#[derive(Debug)]
struct Committed {
    status: StatusCode,
    headers: HeaderMap,
}

/// Response handle owned by a request context.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: HeaderMap,
    committed: Option<Committed>,
    body: BytesMut,
    max_body: Option<usize>,
}

impl ResponseWriter {
    /// Create a writer rejecting bodies larger than `max_body` bytes.
    pub fn new(max_body: usize) -> Self {
        Self {
            max_body: Some(max_body),
            ..Self::default()
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Write the status line. Only the first call has an effect.
    pub fn write_header(&mut self, code: u16) {
        if let Some(committed) = &self.committed {
            tracing::debug!(
                status = %committed.status,
                attempted = code,
                "superfluous write_header call"
            );
            return;
        }
        let status = match StatusCode::from_u16(code) {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(code, "ignoring invalid status code");
                return;
            }
        };
        self.committed = Some(Committed {
            status,
            headers: self.headers.clone(),
        });
    }

    /// Append bytes to the body, committing a 200 status if none was written.
    pub fn write_body(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.committed.is_none() {
            self.write_header(StatusCode::OK.as_u16());
        }
        if data.len() > self.remaining() {
            return Err(io::Error::other(format!(
                "response body exceeds limit of {} bytes",
                self.max_body.unwrap_or(usize::MAX)
            )));
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    /// Bytes that may still be written before hitting the body limit.
    pub fn remaining(&self) -> usize {
        self.max_body
            .map_or(usize::MAX, |max| max.saturating_sub(self.body.len()))
    }

    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// The committed status, or 200 if nothing was committed yet.
    pub fn status(&self) -> StatusCode {
        self.committed
            .as_ref()
            .map_or(StatusCode::OK, |c| c.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response {
        let (status, headers) = match self.committed {
            Some(c) => (c.status, c.headers),
            None => (StatusCode::OK, self.headers),
        };
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_body(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
