//! Transport boundary.
//!
//! # Responsibilities
//! - Send a resolved request over the network
//! - Buffer the response body up to a size limit
//! - Report failures as `TransportError`
//!
//! # Design Decisions
//! - Object-safe trait returning a boxed future so clients can share one
//!   transport behind `Arc<dyn Transport>`
//! - The default transport is a hyper-util legacy client (plain HTTP),
//!   built once per process

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::TransportError;
use crate::http::request::ResolvedRequest;
use crate::http::response::Response;

/// Default cap on buffered response bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Performs the network call between the request and response phases.
pub trait Transport: Send + Sync {
    fn send(&self, request: ResolvedRequest) -> BoxFuture<'static, Result<Response, TransportError>>;
}

/// Transport backed by the hyper-util connection-pooling client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    max_body_bytes: usize,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Process-wide default transport, built on first use.
    ///
    /// Clients and requests without their own transport all share this
    /// connection pool.
    pub fn shared() -> Arc<dyn Transport> {
        static SHARED: OnceLock<Arc<dyn Transport>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::new())).clone()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: ResolvedRequest) -> BoxFuture<'static, Result<Response, TransportError>> {
        let client = self.client.clone();
        let limit = self.max_body_bytes;

        Box::pin(async move {
            let mut builder = hyper::Request::builder()
                .method(request.method)
                .uri(request.url.as_str());
            if let Some(headers) = builder.headers_mut() {
                headers.extend(request.headers);
            }
            let outgoing = builder
                .body(Body::from(request.body))
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let response = client
                .request(outgoing)
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), limit)
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(Response {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        })
    }
}

/// Transport built from an async closure, for tests and in-process fakes.
pub struct FnTransport<F> {
    f: F,
}

impl<F, Fut> FnTransport<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn shared(f: F) -> Arc<dyn Transport> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    fn send(&self, request: ResolvedRequest) -> BoxFuture<'static, Result<Response, TransportError>> {
        Box::pin((self.f)(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Method, StatusCode};
    use url::Url;

    #[tokio::test]
    async fn fn_transport_echoes_the_path() {
        let transport = FnTransport::shared(|req: ResolvedRequest| async move {
            Ok(Response::new(StatusCode::OK).with_body(req.url.path().to_string()))
        });

        let request = ResolvedRequest {
            method: Method::GET,
            url: Url::parse("http://localhost/echo").unwrap(),
            headers: Default::default(),
            body: Default::default(),
        };
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.text().unwrap(), "/echo");
    }

    #[tokio::test]
    async fn hyper_transport_reports_refused_connections() {
        let transport = HyperTransport::new();
        let request = ResolvedRequest {
            method: Method::GET,
            url: Url::parse("http://127.0.0.1:1/").unwrap(),
            headers: Default::default(),
            body: Default::default(),
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
    }

    #[test]
    fn default_transport_is_built_once() {
        let first = HyperTransport::shared();
        let second = HyperTransport::shared();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
