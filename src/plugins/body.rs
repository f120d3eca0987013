//! Request body plugins.

use axum::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::error::Error;
use crate::middleware::Plugin;

fn with_content_type(name: &'static str, body: Bytes, content_type: &'static str) -> Plugin {
    Plugin::request(name, move |ctx, next| {
        ctx.request.body = Some(body.clone());
        if !ctx.request.headers.contains_key(CONTENT_TYPE) {
            ctx.request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        next.run(ctx)
    })
}

pub fn text(body: impl Into<String>) -> Plugin {
    with_content_type("body.text", Bytes::from(body.into()), "text/plain; charset=utf-8")
}

pub fn bytes(body: impl Into<Bytes>) -> Plugin {
    with_content_type("body.bytes", body.into(), "application/octet-stream")
}

/// Serialize `value` as the JSON body. Serialization errors are raised when
/// the request is dispatched.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Plugin {
    match serde_json::to_vec(value) {
        Ok(encoded) => with_content_type("body.json", Bytes::from(encoded), "application/json"),
        Err(e) => {
            let err = Error::Serialization(e.to_string());
            Plugin::request("body.json", move |_ctx, _next| Err(err.clone()))
        }
    }
}
