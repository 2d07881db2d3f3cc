//! Error to business code resolution.

use std::collections::HashMap;

use super::{Ecode, OK, SERVER_ERR};
use crate::error::Error;

/// Maps any recorded error (including none) to a business code.
///
/// `None` must resolve to a success code.
pub trait CodeResolver: Send + Sync + std::fmt::Debug {
    fn cause(&self, err: Option<&Error>) -> Ecode;
}

/// Resolver backed by a message catalog.
///
/// Codes found in the catalog have their message replaced; errors carrying
/// no business code resolve to [`SERVER_ERR`].
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    messages: HashMap<i32, String>,
}

impl CatalogResolver {
    pub fn new(messages: HashMap<i32, String>) -> Self {
        Self { messages }
    }

    fn localize(&self, code: &Ecode) -> Ecode {
        match self.messages.get(&code.code()) {
            Some(message) => Ecode::with_message(code.code(), message.clone()),
            None => code.clone(),
        }
    }
}

impl CodeResolver for CatalogResolver {
    fn cause(&self, err: Option<&Error>) -> Ecode {
        let code = match err {
            None => OK,
            Some(err) => err.ecode().cloned().unwrap_or(SERVER_ERR),
        };
        self.localize(&code)
    }
}
