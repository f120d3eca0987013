//! Request ID plugin.
//!
//! Adds a UUID v4 correlation header unless the request already has one, and
//! records it in the context under `request_id` for logging.

use hyper::header::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::error::Error;
use crate::http::X_REQUEST_ID;
use crate::middleware::Plugin;

/// Context key holding the request ID of the current dispatch.
pub const REQUEST_ID_KEY: &str = "request_id";

pub fn plugin() -> Plugin {
    with_header(X_REQUEST_ID)
}

pub fn with_header(header: &str) -> Plugin {
    let name = HeaderName::from_bytes(header.as_bytes()).map_err(|e| Error::InvalidHeader {
        name: header.to_string(),
        reason: e.to_string(),
    });
    Plugin::request("request_id", move |ctx, next| {
        let name = name.clone()?;
        let id = match ctx.request.headers.get(&name).and_then(|v| v.to_str().ok()) {
            Some(existing) => existing.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                let value = HeaderValue::from_str(&id).map_err(|e| Error::InvalidHeader {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
                ctx.request.headers.insert(name.clone(), value);
                id
            }
        };
        ctx.set(REQUEST_ID_KEY, id);
        next.run(ctx)
    })
}
