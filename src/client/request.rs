//! One-shot requests.

use std::fmt;
use std::sync::Arc;

use crate::client::compose::Compose;
use crate::client::dispatch::{self, Dispatched};
use crate::context::Context;
use crate::error::Result;
use crate::http::{HyperTransport, Response, Transport};
use crate::middleware::Middleware;

/// A single call, derived from a `Client` or built standalone.
///
/// Handlers registered on the request run after every inherited handler of
/// the same phase. `send` consumes the request, so each dispatch needs a
/// fresh one.
pub struct Request {
    context: Context,
    middleware: Middleware,
    transport: Arc<dyn Transport>,
}

impl Request {
    /// Standalone request with its own empty stack and context.
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            middleware: Middleware::new(),
            transport: HyperTransport::shared(),
        }
    }

    pub(crate) fn inheriting(
        middleware: Arc<Middleware>,
        context: Arc<Context>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            context: Context::inheriting(context),
            middleware: Middleware::inheriting(middleware),
            transport,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// Dispatch and keep the final context and state alongside the outcome.
    pub async fn dispatch(self) -> Dispatched {
        dispatch::run(self.context, self.middleware, self.transport).await
    }

    /// Dispatch and return the response or the terminal error.
    pub async fn send(self) -> Result<Response> {
        self.dispatch().await.result
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Compose for Request {
    fn middleware_mut(&mut self) -> &mut Middleware {
        &mut self.middleware
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("context", &self.context.id())
            .field("middleware", &self.middleware)
            .finish()
    }
}
