//! Deadline plugin.
//!
//! The deadline starts when the handler runs, i.e. at dispatch, and is
//! combined with any signal already attached to the request context.

use std::time::Duration;

use crate::context::{CancelSignal, Context};
use crate::middleware::Plugin;

pub fn plugin(after: Duration) -> Plugin {
    Plugin::request("timeout", move |ctx, next| {
        attach(ctx, CancelSignal::timeout(after));
        next.run(ctx)
    })
}

/// Attach an externally owned signal, replacing the context's own one.
pub fn cancel_signal(signal: CancelSignal) -> Plugin {
    Plugin::request("cancel_signal", move |ctx, next| {
        ctx.set_cancel_signal(signal.clone());
        next.run(ctx)
    })
}

fn attach(ctx: &mut Context, deadline: CancelSignal) {
    let combined = match ctx.cancel_signal() {
        Some(existing) => existing.clone().or(deadline),
        None => deadline,
    };
    ctx.set_cancel_signal(combined);
}
