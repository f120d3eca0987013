//! Error taxonomy for the dispatch engine.
//!
//! # Propagation
//! ```text
//! request phase  ─┐
//! transport      ─┼─ Err(e) → ctx.error = e → error phase → recovered? → Response
//! response phase ─┘                                       → otherwise  → Err(e)
//! ```
//!
//! `InvalidPhase`, `InvalidUrl` and friends are raised at registration or
//! resolution time. `Cancelled` is routed through the error phase but can
//! never be recovered from.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::middleware::Phase;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or dispatching a request.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A phase name did not match `request`, `response` or `error`.
    #[error("invalid middleware phase: {0}")]
    InvalidPhase(String),

    /// A handler explicitly failed mid-chain.
    #[error("handler error: {0}")]
    Handler(String),

    /// The transport could not complete the call.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A cancellation signal fired before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// The outgoing URL could not be resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value was rejected.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A request body could not be serialized, or a response body decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Linking a context parent would create a cycle.
    #[error("context inheritance cycle detected")]
    InheritanceCycle,

    /// A phase stopped without producing a response.
    #[error("{0} phase stopped without a response")]
    ShortCircuited(Phase),

    /// Client configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Shorthand for raising a handler failure.
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// True for `Cancelled`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Short label used in metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidPhase(_) => "invalid_phase",
            Error::Handler(_) => "handler",
            Error::Transport(_) => "transport",
            Error::Cancelled => "cancelled",
            Error::InvalidUrl(_) => "invalid_url",
            Error::InvalidHeader { .. } => "invalid_header",
            Error::Serialization(_) => "serialization",
            Error::InheritanceCycle => "inheritance_cycle",
            Error::ShortCircuited(_) => "short_circuited",
            Error::Config(_) => "config",
        }
    }
}

/// Failures reported by a [`Transport`](crate::http::Transport).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection could not be established or was reset.
    #[error("connection error: {0}")]
    Connect(String),

    /// The request could not be built for the wire.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read.
    #[error("body error: {0}")]
    Body(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Other(String),
}
