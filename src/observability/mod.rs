//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch.rs produces:
//!     → tracing events (state transitions, completion, failure)
//!     → metrics.rs (request counters, latency histogram)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, filtered by RUST_LOG / config)
//!     → any `metrics` recorder installed by the application
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the
//!   application's choice
//! - Request ID flows through log fields when the request_id plugin is on

pub mod logging;
pub mod metrics;
