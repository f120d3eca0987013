//! Response representation.
//!
//! The body is buffered by the transport so response-phase handlers can
//! read and rewrite it without dealing with streams.

use axum::body::Bytes;
use hyper::header::HeaderMap;
use hyper::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// A response produced by the transport or by an error-phase fallback.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Serialization(e.to_string()))
    }
}
