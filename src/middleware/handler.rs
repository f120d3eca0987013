//! Handler chain execution.
//!
//! A handler receives the context and a [`Next`] continuation. Calling
//! `next.run(ctx)` hands control to the rest of the chain; returning without
//! calling it stops the phase; returning `Err` aborts the phase.

use std::cell::Cell;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};

/// A unit of middleware logic, shared between every stack that inherits it.
pub type Handler = Arc<dyn Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How a phase ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Every handler continued to the end of the chain.
    Completed,
    /// A handler returned without calling `next`.
    Stopped,
}

/// Continuation over the remaining handlers of a phase.
///
/// Consumed on use, so a handler can continue the chain at most once.
pub struct Next<'a> {
    remaining: &'a [Handler],
    reached_end: &'a Cell<bool>,
    observe_cancel: bool,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain against `ctx`.
    ///
    /// Fails with [`Error::Cancelled`] at the handler boundary if a
    /// cancellation signal in the context chain has fired.
    pub fn run(self, ctx: &mut Context) -> Result<()> {
        if self.observe_cancel && ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.remaining.split_first() {
            Some((head, rest)) => head(
                ctx,
                Next {
                    remaining: rest,
                    reached_end: self.reached_end,
                    observe_cancel: self.observe_cancel,
                },
            ),
            None => {
                self.reached_end.set(true);
                Ok(())
            }
        }
    }

    /// Number of handlers still to run after this point.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

/// Execute `sequence` as a chain against `ctx`.
pub(crate) fn run_chain(
    sequence: &[Handler],
    ctx: &mut Context,
    observe_cancel: bool,
) -> Result<PhaseOutcome> {
    let reached_end = Cell::new(false);
    Next {
        remaining: sequence,
        reached_end: &reached_end,
        observe_cancel,
    }
    .run(ctx)?;

    if reached_end.get() {
        Ok(PhaseOutcome::Completed)
    } else {
        Ok(PhaseOutcome::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelSignal;

    fn push(tag: &'static str) -> Handler {
        handler(move |ctx, next| {
            ctx.push_trace(tag);
            next.run(ctx)
        })
    }

    #[test]
    fn runs_every_handler_in_order() {
        let chain = vec![push("a"), push("b"), push("c")];
        let mut ctx = Context::new();

        let outcome = run_chain(&chain, &mut ctx, true).unwrap();
        assert_eq!(outcome, PhaseOutcome::Completed);
        assert_eq!(ctx.trace(), vec!["a", "b", "c"]);
    }

    #[test]
    fn handler_that_skips_next_stops_the_chain() {
        let stop = handler(|ctx, _next| {
            ctx.push_trace("b");
            Ok(())
        });
        let chain = vec![push("a"), stop, push("c")];
        let mut ctx = Context::new();

        let outcome = run_chain(&chain, &mut ctx, true).unwrap();
        assert_eq!(outcome, PhaseOutcome::Stopped);
        assert_eq!(ctx.trace(), vec!["a", "b"]);
    }

    #[test]
    fn error_aborts_remaining_handlers() {
        let fail = handler(|_ctx, _next| Err(Error::handler("boom")));
        let chain = vec![push("a"), fail, push("c")];
        let mut ctx = Context::new();

        let err = run_chain(&chain, &mut ctx, true).unwrap_err();
        assert!(matches!(err, Error::Handler(ref msg) if msg == "boom"));
        assert_eq!(ctx.trace(), vec!["a"]);
    }

    #[test]
    fn handlers_can_work_after_next_returns() {
        let wrap = handler(|ctx, next| {
            ctx.push_trace("before");
            next.run(ctx)?;
            ctx.push_trace("after");
            Ok(())
        });
        let chain = vec![wrap, push("inner")];
        let mut ctx = Context::new();

        run_chain(&chain, &mut ctx, true).unwrap();
        assert_eq!(ctx.trace(), vec!["before", "inner", "after"]);
    }

    #[test]
    fn cancellation_is_observed_at_the_next_boundary() {
        let cancel = handler(|ctx, next| {
            ctx.set_cancel_signal(CancelSignal::triggered());
            next.run(ctx)
        });
        let chain = vec![cancel, push("never")];
        let mut ctx = Context::new();

        let err = run_chain(&chain, &mut ctx, true).unwrap_err();
        assert!(err.is_cancelled());
        assert!(ctx.trace().is_empty());
    }

    #[test]
    fn empty_chain_completes() {
        let mut ctx = Context::new();
        assert_eq!(run_chain(&[], &mut ctx, true).unwrap(), PhaseOutcome::Completed);
    }
}
