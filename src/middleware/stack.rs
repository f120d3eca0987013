//! Middleware stack with snapshot inheritance.
//!
//! # Ordering
//! ```text
//! effective(phase) = effective(parent, phase) ++ local(phase)
//! ```
//! The parent is an `Arc` snapshot taken when inheritance was set up. It is
//! never mutated afterwards, so many children can read it concurrently and
//! handlers added to the original stack later stay invisible to them.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::middleware::handler::{handler, run_chain, Handler, Next, PhaseOutcome};
use crate::middleware::phase::Phase;
use crate::middleware::plugin::Plugin;

/// Ordered handlers for the request, response and error phases.
#[derive(Clone, Default)]
pub struct Middleware {
    parent: Option<Arc<Middleware>>,
    request: Vec<Handler>,
    response: Vec<Handler>,
    error: Vec<Handler>,
    plugins: Vec<String>,
}

impl Middleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new empty stack that inherits from `parent`.
    pub fn inheriting(parent: Arc<Middleware>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Append `handler` to the local sequence of `phase`.
    pub fn use_phase(&mut self, phase: Phase, handler: Handler) -> &mut Self {
        self.local_mut(phase).push(handler);
        self
    }

    /// Append a handler to a phase given by name.
    pub fn use_phase_name(&mut self, phase: &str, handler: Handler) -> Result<&mut Self> {
        let phase = phase.parse::<Phase>()?;
        Ok(self.use_phase(phase, handler))
    }

    pub fn use_request<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.use_phase(Phase::Request, handler(f))
    }

    pub fn use_response<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.use_phase(Phase::Response, handler(f))
    }

    pub fn use_error<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.use_phase(Phase::Error, handler(f))
    }

    /// Register every handler of `plugin` in its declared order.
    pub fn use_plugin(&mut self, plugin: Plugin) -> &mut Self {
        for (phase, handler) in plugin.handlers() {
            self.local_mut(*phase).push(handler.clone());
        }
        tracing::trace!(plugin = plugin.name(), "Plugin registered");
        self.plugins.push(plugin.name().to_string());
        self
    }

    /// Set the parent whose effective sequences run before this stack's own.
    pub fn inherit_from(&mut self, parent: Arc<Middleware>) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    pub fn parent(&self) -> Option<&Arc<Middleware>> {
        self.parent.as_ref()
    }

    /// Freeze the current state for children to inherit.
    pub fn snapshot(&self) -> Arc<Middleware> {
        Arc::new(self.clone())
    }

    /// Handlers registered directly on this stack.
    pub fn local(&self, phase: Phase) -> &[Handler] {
        match phase {
            Phase::Request => &self.request,
            Phase::Response => &self.response,
            Phase::Error => &self.error,
        }
    }

    fn local_mut(&mut self, phase: Phase) -> &mut Vec<Handler> {
        match phase {
            Phase::Request => &mut self.request,
            Phase::Response => &mut self.response,
            Phase::Error => &mut self.error,
        }
    }

    /// Names of the plugins registered on this stack, in order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Number of stacks in the chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    /// The inheritance-resolved handler sequence for `phase`.
    pub fn effective_sequence(&self, phase: Phase) -> Vec<Handler> {
        let mut levels = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent.as_deref() {
            levels.push(parent);
            current = parent;
        }

        let mut sequence = Vec::new();
        for level in levels.into_iter().rev() {
            sequence.extend(level.local(phase).iter().cloned());
        }
        sequence
    }

    /// Run the effective sequence of `phase` against `ctx`.
    ///
    /// The request and response phases abort with `Cancelled` at the next
    /// handler boundary once a signal fires. The error phase always runs to
    /// completion so it can observe the failure.
    pub fn run_phase(&self, phase: Phase, ctx: &mut Context) -> Result<PhaseOutcome> {
        let sequence = self.effective_sequence(phase);
        run_chain(&sequence, ctx, phase != Phase::Error)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("depth", &self.depth())
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("error", &self.error.len())
            .field("plugins", &self.plugins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelSignal;
    use crate::error::Error;

    fn tag(name: &'static str) -> Handler {
        handler(move |ctx, next| {
            ctx.push_trace(name);
            next.run(ctx)
        })
    }

    fn traced(stack: &Middleware, phase: Phase) -> Vec<String> {
        let mut ctx = Context::new();
        stack.run_phase(phase, &mut ctx).unwrap();
        ctx.trace()
    }

    #[test]
    fn parent_handlers_run_first() {
        let mut parent = Middleware::new();
        parent.use_phase(Phase::Request, tag("p1"));
        parent.use_phase(Phase::Request, tag("p2"));

        let mut child = Middleware::inheriting(parent.snapshot());
        child.use_phase(Phase::Request, tag("c1"));

        assert_eq!(child.effective_sequence(Phase::Request).len(), 3);
        assert_eq!(traced(&child, Phase::Request), vec!["p1", "p2", "c1"]);
        assert_eq!(traced(&parent, Phase::Request), vec!["p1", "p2"]);
    }

    #[test]
    fn three_levels_resolve_root_first() {
        let mut root = Middleware::new();
        root.use_phase(Phase::Response, tag("root"));
        let mut mid = Middleware::inheriting(root.snapshot());
        mid.use_phase(Phase::Response, tag("mid"));
        let mut leaf = Middleware::inheriting(mid.snapshot());
        leaf.use_phase(Phase::Response, tag("leaf"));

        assert_eq!(leaf.depth(), 3);
        assert_eq!(traced(&leaf, Phase::Response), vec!["root", "mid", "leaf"]);
        assert!(traced(&leaf, Phase::Request).is_empty());
    }

    #[test]
    fn siblings_do_not_see_each_other() {
        let mut parent = Middleware::new();
        parent.use_phase(Phase::Request, tag("parent"));
        let snapshot = parent.snapshot();

        let mut left = Middleware::inheriting(snapshot.clone());
        left.use_phase(Phase::Request, tag("left"));
        let mut right = Middleware::inheriting(snapshot);
        right.use_phase(Phase::Request, tag("right"));

        assert_eq!(traced(&left, Phase::Request), vec!["parent", "left"]);
        assert_eq!(traced(&right, Phase::Request), vec!["parent", "right"]);
    }

    #[test]
    fn parent_changes_after_snapshot_are_not_inherited() {
        let mut parent = Middleware::new();
        parent.use_phase(Phase::Request, tag("early"));
        let child = Middleware::inheriting(parent.snapshot());

        parent.use_phase(Phase::Request, tag("late"));

        assert_eq!(traced(&child, Phase::Request), vec!["early"]);
        assert_eq!(traced(&parent, Phase::Request), vec!["early", "late"]);
    }

    #[test]
    fn plugin_handlers_land_in_their_phases() {
        let plugin = Plugin::new("pair")
            .on_phase(Phase::Request, tag("req"))
            .on_phase(Phase::Error, tag("err"))
            .on_phase(Phase::Request, tag("req2"));

        let mut stack = Middleware::new();
        stack.use_plugin(plugin);

        assert_eq!(stack.plugins().to_vec(), vec!["pair".to_string()]);
        assert_eq!(traced(&stack, Phase::Request), vec!["req", "req2"]);
        assert_eq!(traced(&stack, Phase::Error), vec!["err"]);
    }

    #[test]
    fn unknown_phase_name_is_rejected() {
        let mut stack = Middleware::new();
        let err = stack.use_phase_name("teardown", tag("x")).unwrap_err();
        assert!(matches!(err, Error::InvalidPhase(_)));
        assert!(stack.local(Phase::Request).is_empty());

        stack.use_phase_name("request", tag("x")).unwrap();
        assert_eq!(stack.local(Phase::Request).len(), 1);
    }

    #[test]
    fn error_phase_ignores_cancellation() {
        let mut stack = Middleware::new();
        stack.use_phase(Phase::Error, tag("observed"));

        let mut ctx = Context::new();
        ctx.set_cancel_signal(CancelSignal::triggered());
        stack.run_phase(Phase::Error, &mut ctx).unwrap();
        assert_eq!(ctx.trace(), vec!["observed"]);

        stack.use_phase(Phase::Request, tag("skipped"));
        let err = stack.run_phase(Phase::Request, &mut ctx).unwrap_err();
        assert!(err.is_cancelled());
    }
}
