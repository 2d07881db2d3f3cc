//! Business (application-level) result codes.
//!
//! # Responsibilities
//! - Represent a business code and its human message
//! - Provide the canonical codes used by the framework itself
//! - Resolve arbitrary errors into a code via an injected resolver
//!
//! # Design Decisions
//! - Business codes are independent of the HTTP transport status
//! - No global registry: message overrides live in a [`CatalogResolver`]
//!   owned by the engine and swapped on config reload

pub mod resolver;

pub use resolver::{CatalogResolver, CodeResolver};

use std::borrow::Cow;

/// A business code with its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct Ecode {
    code: i32,
    message: Cow<'static, str>,
}

impl Ecode {
    pub const fn new(code: i32, message: &'static str) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
        }
    }

    /// Create a code with an owned message.
    pub fn with_message(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Cow::Owned(message.into()),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub const OK: Ecode = Ecode::new(0, "OK");
pub const NOT_MODIFIED: Ecode = Ecode::new(-304, "Not Modified");
pub const REQUEST_ERR: Ecode = Ecode::new(-400, "Bad Request");
pub const UNAUTHORIZED: Ecode = Ecode::new(-401, "Unauthorized");
pub const ACCESS_DENIED: Ecode = Ecode::new(-403, "Access Denied");
pub const NOT_FOUND: Ecode = Ecode::new(-404, "Not Found");
pub const METHOD_NOT_ALLOWED: Ecode = Ecode::new(-405, "Method Not Allowed");
pub const CONFLICT: Ecode = Ecode::new(-409, "Conflict");
pub const CANCELED: Ecode = Ecode::new(-498, "Canceled");
pub const SERVER_ERR: Ecode = Ecode::new(-500, "Internal Server Error");
pub const SERVICE_UNAVAILABLE: Ecode = Ecode::new(-503, "Service Unavailable");
pub const DEADLINE: Ecode = Ecode::new(-504, "Deadline Exceeded");
pub const LIMIT_EXCEED: Ecode = Ecode::new(-509, "Limit Exceeded");
