//! Execution context subsystem.
//!
//! # Data Flow
//! ```text
//! Client context template ──snapshot──▶ Arc<Context> (frozen)
//!                                           ▲ parent
//! Request context (per dispatch) ───────────┘
//!     → request-phase handlers mutate ctx.request
//!     → transport fills ctx.response
//!     → response / error handlers read and rewrite it
//! ```
//!
//! # Design Decisions
//! - Parents are immutable snapshots: a child never writes through to them
//! - Lookups read through the parent chain; own values win
//! - Each context has an identity so linking it under its own snapshot (or a
//!   descendant) is rejected as a cycle

pub mod cancel;

pub use cancel::{CancelHandle, CancelSignal};

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::http::{OutgoingRequest, Response};

/// Mutable per-call state passed through every handler.
#[derive(Debug, Clone)]
pub struct Context {
    id: Uuid,
    parent: Option<Arc<Context>>,
    /// The outgoing request being assembled.
    pub request: OutgoingRequest,
    /// Populated by the transport, or by an error-phase fallback.
    pub response: Option<Response>,
    /// Set while the error phase runs. Clearing it marks the failure as handled.
    pub error: Option<Error>,
    cancel: Option<CancelSignal>,
    store: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            request: OutgoingRequest::default(),
            response: None,
            error: None,
            cancel: None,
            store: HashMap::new(),
        }
    }

    /// A fresh context reading through to `parent`.
    ///
    /// The outgoing request starts as a copy of the parent's.
    pub fn inheriting(parent: Arc<Context>) -> Self {
        let mut ctx = Self::new();
        ctx.attach(parent);
        ctx
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent(&self) -> Option<&Arc<Context>> {
        self.parent.as_ref()
    }

    /// Link `parent` as this context's parent, replacing any previous link,
    /// and fill unset request fields from it.
    ///
    /// Fails with `InheritanceCycle` when `parent` is a snapshot of this
    /// context or of one of its descendants.
    pub fn link_parent(&mut self, parent: Arc<Context>) -> Result<()> {
        let mut cursor = Some(&parent);
        while let Some(ctx) = cursor {
            if ctx.id == self.id {
                return Err(Error::InheritanceCycle);
            }
            cursor = ctx.parent.as_ref();
        }
        self.attach(parent);
        Ok(())
    }

    /// Request fields this context leaves unset are taken from `parent`.
    fn attach(&mut self, parent: Arc<Context>) {
        self.request.inherit_from(&parent.request);
        self.parent = Some(parent);
    }

    /// Freeze the current state for children to inherit.
    pub fn snapshot(&self) -> Arc<Context> {
        Arc::new(self.clone())
    }

    /// Set a value on this context only.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.store.insert(key.into(), value.into());
    }

    /// Own value if present, else the nearest ancestor's.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store
            .get(key)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(key)))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove an own value. Inherited values stay visible.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.store.remove(key)
    }

    /// Attach `signal`, replacing this context's previous one.
    pub fn set_cancel_signal(&mut self, signal: CancelSignal) {
        self.cancel = Some(signal);
    }

    pub fn cancel_signal(&self) -> Option<&CancelSignal> {
        self.cancel.as_ref()
    }

    /// Every signal in the chain, own first.
    pub fn cancel_signals(&self) -> Vec<CancelSignal> {
        let mut signals = Vec::new();
        let mut cursor = Some(self);
        while let Some(ctx) = cursor {
            if let Some(signal) = &ctx.cancel {
                signals.push(signal.clone());
            }
            cursor = ctx.parent.as_deref();
        }
        signals
    }

    /// True once any signal in the chain has fired.
    pub fn is_cancelled(&self) -> bool {
        let mut cursor = Some(self);
        while let Some(ctx) = cursor {
            if ctx.cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
                return true;
            }
            cursor = ctx.parent.as_deref();
        }
        false
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Context {
    pub(crate) fn push_trace(&mut self, tag: &str) {
        let mut trace = self.trace();
        trace.push(tag.to_string());
        self.set("trace", trace);
    }

    pub(crate) fn trace(&self) -> Vec<String> {
        self.get("trace")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
