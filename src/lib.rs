//! Composable HTTP client with phase-aware middleware.
//!
//! # Overview
//! ```text
//!   Client (base) ── headers, base URL, timeout ...
//!      │ derive()                     snapshot of stack + context
//!      ▼
//!   Client (svc) ── service headers, path ...
//!      │ request() / get() / post()   snapshot again
//!      ▼
//!   Request ── per-call handlers, body
//!      │ send()
//!      ▼
//!   request phase → transport → response phase
//!                 ↘ error phase (on any failure)
//! ```
//!
//! Building only registers handlers; nothing touches the network until
//! `send`. Parents run before children, and within one level handlers run in
//! registration order.
//!
//! ```no_run
//! use layered_client::{Client, Compose};
//!
//! # async fn demo() -> layered_client::Result<()> {
//! let base = Client::new()
//!     .base_url("http://localhost:8080")
//!     .set_header("x-trace", "1");
//! let billing = base.derive().set_header("x-service", "billing");
//!
//! let response = billing.get().url("/accounts").send().await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod plugins;

pub use client::{Client, Compose, DispatchState, Dispatched, Request};
pub use config::ClientConfig;
pub use context::{CancelHandle, CancelSignal, Context};
pub use error::{Error, Result, TransportError};
pub use http::{Cookie, Response, Transport};
pub use middleware::{Handler, Middleware, Next, Phase, PhaseOutcome, Plugin};
