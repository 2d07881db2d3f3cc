//! Crate-wide error type.
//!
//! Errors are never propagated out of the dispatch loop. They are recorded
//! on the [`Context`](crate::context::Context) for inspection by middleware
//! that runs after `next()` returns.

use crate::ecode::Ecode;

/// Boxed application error accepted by the rendering helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors recorded on a request context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A business code returned by application code.
    #[error(transparent)]
    Code(#[from] Ecode),

    #[error("json encode: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml encode: {0}")]
    Xml(#[from] quick_xml::SeError),

    #[error("protobuf encode: {0}")]
    Protobuf(#[from] prost::EncodeError),

    /// Writing to the response failed.
    #[error("response write: {0}")]
    Write(#[from] std::io::Error),

    #[error("cannot redirect with status code {0}")]
    InvalidRedirect(u16),

    /// Any other application error.
    #[error(transparent)]
    App(BoxError),
}

impl Error {
    /// Wrap an arbitrary application error.
    pub fn app(err: impl Into<BoxError>) -> Self {
        Error::App(err.into())
    }

    /// The business code carried by this error, if any.
    ///
    /// Boxed application errors are searched through their source chain.
    pub fn ecode(&self) -> Option<&Ecode> {
        match self {
            Error::Code(code) => Some(code),
            Error::App(err) => {
                let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err.as_ref());
                while let Some(e) = current {
                    if let Some(code) = e.downcast_ref::<Ecode>() {
                        return Some(code);
                    }
                    current = e.source();
                }
                None
            }
            _ => None,
        }
    }
}
