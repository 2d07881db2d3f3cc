//! Protocol buffer envelope.

use axum::http::HeaderValue;
use bytes::{BufMut, BytesMut};
use prost::{Message, Name};
use prost_types::Any;

use super::{write_content_type, Render, PROTOBUF_CONTENT_TYPE};
use crate::error::Error;
use crate::http::ResponseWriter;

pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

/// Envelope carrying the business code and a type-tagged payload.
#[derive(Clone, PartialEq, Message)]
pub struct PbEnvelope {
    #[prost(int64, tag = "1")]
    pub code: i64,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, optional, tag = "3")]
    pub data: Option<Any>,
}

/// Pack `data` into an `Any`, failing if it encodes to more than `limit` bytes.
pub fn pack<M: Message + Name>(data: &M, limit: usize) -> Result<Any, prost::EncodeError> {
    let mut buf = BytesMut::with_capacity(data.encoded_len().min(limit)).limit(limit);
    data.encode(&mut buf)?;
    Ok(Any {
        type_url: format!("{TYPE_URL_PREFIX}{}", M::full_name()),
        value: buf.into_inner().to_vec(),
    })
}

impl Render for PbEnvelope {
    fn write_content_type(&self, w: &mut ResponseWriter) {
        write_content_type(w, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
    }

    fn render(&self, w: &mut ResponseWriter) -> Result<(), Error> {
        let mut buf = BytesMut::with_capacity(self.encoded_len()).limit(w.remaining());
        self.encode(&mut buf)?;
        w.write_body(&buf.into_inner())?;
        Ok(())
    }
}
