//! HTTP representations and the transport boundary.
//!
//! # Data Flow
//! ```text
//! request-phase handlers
//!     → request.rs (OutgoingRequest: method, origin, path, query, headers, cookies, body)
//!     → OutgoingRequest::resolve() → ResolvedRequest (absolute URL, Cookie header)
//!     → transport.rs (Transport::send, the only network I/O)
//!     → response.rs (Response: status, headers, buffered body)
//!     → response-phase handlers
//! ```
//!
//! # Design Decisions
//! - Plain owned data so contexts can be cloned into snapshots
//! - URL stays decomposed until dispatch so path templating works on segments
//! - Transport is a trait; the default speaks HTTP/1.1 over hyper-util

pub mod request;
pub mod response;
pub mod transport;

pub use request::{Cookie, OutgoingRequest, ResolvedRequest};
pub use response::Response;
pub use transport::{FnTransport, HyperTransport, Transport};

pub use hyper::header::{HeaderMap, HeaderName, HeaderValue};
pub use hyper::{Method, StatusCode};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";
