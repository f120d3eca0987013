//! Dispatch state machine.
//!
//! # States
//! ```text
//! Pending → RunningRequestPhase → Sent → RunningResponsePhase → Completed
//!                 │                 │              │
//!                 └──── Errored ◀───┴──────────────┘
//!                          → RunningErrorPhase → Failed
//!                                              → Completed (recovered)
//! ```
//!
//! # Rules
//! - A request-phase short-circuit skips the transport; a response placed in
//!   the context by the stopping handler is returned as is
//! - The transport call races every cancellation signal in the context
//!   chain; cancellation wins when both are ready
//! - Error-phase handlers recover by clearing `ctx.error` and leaving a
//!   response in `ctx.response`; `Cancelled` is never recoverable

use std::sync::Arc;
use std::time::Instant;

use crate::context::{CancelSignal, Context};
use crate::error::{Error, Result};
use crate::http::{Response, Transport};
use crate::middleware::{Middleware, Phase, PhaseOutcome};
use crate::observability::metrics;
use crate::plugins::request_id::REQUEST_ID_KEY;

/// Where a dispatch currently is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Pending,
    RunningRequestPhase,
    Sent,
    RunningResponsePhase,
    Completed,
    Errored,
    RunningErrorPhase,
    Failed,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Completed | DispatchState::Failed)
    }
}

/// Outcome of a dispatch together with the context it ran against.
#[derive(Debug)]
pub struct Dispatched {
    pub state: DispatchState,
    pub context: Context,
    pub result: Result<Response>,
}

struct Machine {
    state: DispatchState,
}

impl Machine {
    fn advance(&mut self, ctx: &Context, next: DispatchState) {
        tracing::debug!(
            request_id = ctx.get_str(REQUEST_ID_KEY).unwrap_or("-"),
            from = ?self.state,
            to = ?next,
            "Dispatch state transition"
        );
        self.state = next;
    }
}

pub(crate) async fn run(
    mut ctx: Context,
    middleware: Middleware,
    transport: Arc<dyn Transport>,
) -> Dispatched {
    let started = Instant::now();
    let mut machine = Machine {
        state: DispatchState::Pending,
    };

    let result = drive(&mut ctx, &middleware, transport.as_ref(), &mut machine).await;

    let method = ctx.request.method.to_string();
    match &result {
        Ok(response) => {
            tracing::info!(
                request_id = ctx.get_str(REQUEST_ID_KEY).unwrap_or("-"),
                method = %method,
                path = %ctx.request.path,
                status = response.status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request completed"
            );
            metrics::record_dispatch(&method, "completed", started);
        }
        Err(err) => {
            tracing::warn!(
                request_id = ctx.get_str(REQUEST_ID_KEY).unwrap_or("-"),
                method = %method,
                path = %ctx.request.path,
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request failed"
            );
            metrics::record_dispatch(&method, err.kind(), started);
        }
    }

    Dispatched {
        state: machine.state,
        context: ctx,
        result,
    }
}

async fn drive(
    ctx: &mut Context,
    middleware: &Middleware,
    transport: &dyn Transport,
    machine: &mut Machine,
) -> Result<Response> {
    machine.advance(ctx, DispatchState::RunningRequestPhase);
    match middleware.run_phase(Phase::Request, ctx) {
        Ok(PhaseOutcome::Completed) => {}
        Ok(PhaseOutcome::Stopped) => {
            return match ctx.response.take() {
                Some(response) => {
                    machine.advance(ctx, DispatchState::Completed);
                    Ok(response)
                }
                None => {
                    machine.advance(ctx, DispatchState::Failed);
                    Err(Error::ShortCircuited(Phase::Request))
                }
            };
        }
        Err(err) => return recover(ctx, middleware, machine, err),
    }

    let resolved = match ctx.request.resolve() {
        Ok(resolved) => resolved,
        Err(err) => return recover(ctx, middleware, machine, err),
    };

    let signals = ctx.cancel_signals();
    let sent = tokio::select! {
        biased;
        _ = CancelSignal::any(&signals) => Err(Error::Cancelled),
        res = transport.send(resolved) => res.map_err(Error::from),
    };
    match sent {
        Ok(response) => ctx.response = Some(response),
        Err(err) => return recover(ctx, middleware, machine, err),
    }
    machine.advance(ctx, DispatchState::Sent);

    machine.advance(ctx, DispatchState::RunningResponsePhase);
    if let Err(err) = middleware.run_phase(Phase::Response, ctx) {
        return recover(ctx, middleware, machine, err);
    }

    match ctx.response.take() {
        Some(response) => {
            machine.advance(ctx, DispatchState::Completed);
            Ok(response)
        }
        None => {
            machine.advance(ctx, DispatchState::Failed);
            Err(Error::ShortCircuited(Phase::Response))
        }
    }
}

fn recover(
    ctx: &mut Context,
    middleware: &Middleware,
    machine: &mut Machine,
    err: Error,
) -> Result<Response> {
    machine.advance(ctx, DispatchState::Errored);
    ctx.error = Some(err.clone());

    machine.advance(ctx, DispatchState::RunningErrorPhase);
    let remaining = match middleware.run_phase(Phase::Error, ctx) {
        Ok(_) => ctx.error.take(),
        Err(raised) => Some(raised),
    };

    if err.is_cancelled() {
        ctx.response = None;
        machine.advance(ctx, DispatchState::Failed);
        return Err(Error::Cancelled);
    }

    match (remaining, ctx.response.take()) {
        (None, Some(fallback)) => {
            tracing::debug!(error = %err, "Error phase recovered");
            machine.advance(ctx, DispatchState::Completed);
            Ok(fallback)
        }
        (Some(final_err), _) => {
            machine.advance(ctx, DispatchState::Failed);
            Err(final_err)
        }
        (None, None) => {
            machine.advance(ctx, DispatchState::Failed);
            Err(err)
        }
    }
}
