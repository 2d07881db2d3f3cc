//! Request binding with automatic failure responses.

use serde::de::DeserializeOwned;
use validator::Validate;

use super::Context;
use crate::binding::{translate::translate_all, BindError, Binding};
use crate::ecode::REQUEST_ERR;
use crate::render::Json;

impl Context {
    /// Decode the request with the binding chosen from its method and
    /// `Content-Type`, then validate the result.
    ///
    /// On failure a `-400` envelope is written, the chain is aborted and
    /// the error is returned. Handlers only need to return early.
    pub fn bind<T>(&mut self) -> Result<T, BindError>
    where
        T: DeserializeOwned + Validate,
    {
        match Binding::for_request(&self.request) {
            Ok(binding) => self.bind_with(binding),
            Err(err) => Err(self.bind_failed(err)),
        }
    }

    /// Like [`bind`](Self::bind) with an explicit binding.
    pub fn bind_with<T>(&mut self, binding: Binding) -> Result<T, BindError>
    where
        T: DeserializeOwned + Validate,
    {
        binding
            .bind(&self.request)
            .map_err(|err| self.bind_failed(err))
    }

    fn bind_failed(&mut self, err: BindError) -> BindError {
        self.error = Some(REQUEST_ERR.into());
        self.error_msg = err.to_string();

        let message = match &err {
            BindError::Validation(errors) => {
                translate_all(errors, self.settings.translator.as_ref())
                    .into_iter()
                    .map(|m| m + ";")
                    .collect()
            }
            other => other.to_string(),
        };
        tracing::debug!(error = %self.error_msg, "request binding failed");

        self.write_bcode(&REQUEST_ERR);
        self.render(
            Some(200),
            Json::<()> {
                code: REQUEST_ERR.code(),
                message,
                data: None,
            },
        );
        self.abort();
        err
    }
}
