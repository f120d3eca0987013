//! Plugins: named bundles of phase handlers registered atomically.

use std::fmt;

use crate::context::Context;
use crate::error::Result;
use crate::middleware::handler::{handler, Handler, Next};
use crate::middleware::phase::Phase;

/// An immutable bundle of `(phase, handler)` pairs.
///
/// Registration copies every pair into the target stack in declared order.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    handlers: Vec<(Phase, Handler)>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Single request-phase handler plugin.
    pub fn request<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(name).on_request(f)
    }

    pub fn on_request<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_phase(Phase::Request, handler(f))
    }

    pub fn on_response<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_phase(Phase::Response, handler(f))
    }

    pub fn on_error<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_phase(Phase::Error, handler(f))
    }

    pub fn on_phase(mut self, phase: Phase, handler: Handler) -> Self {
        self.handlers.push((phase, handler));
        self
    }

    /// Add a handler for a phase given by name, as supplied by external plugin
    /// definitions. Unknown names fail with `InvalidPhase`.
    pub fn on_phase_name(self, phase: &str, handler: Handler) -> Result<Self> {
        let phase = phase.parse::<Phase>()?;
        Ok(self.on_phase(phase, handler))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &[(Phase, Handler)] {
        &self.handlers
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phases: Vec<Phase> = self.handlers.iter().map(|(phase, _)| *phase).collect();
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("phases", &phases)
            .finish()
    }
}
