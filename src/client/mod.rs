//! Client composition.
//!
//! # Data Flow
//! ```text
//! Client::new()                       (context template + empty stack)
//!     → builder calls                 (append handlers / plugins)
//!     → derive() / use_parent()       (snapshot parent stack + context)
//!     → request() / get() / post() …  (snapshot this client for one call)
//!     → Request::send()               (dispatch.rs state machine)
//! ```
//!
//! # Design Decisions
//! - Copy-on-derive: `use_parent` and `request` freeze `Arc` snapshots, so a
//!   configured client can be shared across tasks and dispatched from
//!   concurrently without locks
//! - Handlers added to a client after a child or request was derived are not
//!   seen by that child or request
//! - Builders never mutate the context template; they register handlers that
//!   replay the mutation for each request

pub mod compose;
pub mod dispatch;
pub mod request;

pub use compose::Compose;
pub use dispatch::{Dispatched, DispatchState};
pub use request::Request;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hyper::Method;

use crate::config::validation::validate_config;
use crate::config::{loader::ConfigError, ClientConfig};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::{HyperTransport, Transport};
use crate::middleware::Middleware;
use crate::plugins::cookies::CookieJar;
use crate::plugins::request_id;

/// Reusable configuration unit from which requests are derived.
#[derive(Clone, Default)]
pub struct Client {
    parent: Option<Arc<Client>>,
    context: Context,
    middleware: Middleware,
    transport: Option<Arc<dyn Transport>>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client that replays `config` on every request.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        validate_config(config).map_err(|errors| Error::Config(ConfigError::Validation(errors)))?;

        let mut client = Client::new();
        if let Some(base_url) = &config.base_url {
            client = client.base_url(base_url);
        }
        if !config.headers.is_empty() {
            client = client.set_headers(config.headers.iter());
        }
        if config.timeouts.request_ms > 0 {
            client = client.timeout(Duration::from_millis(config.timeouts.request_ms));
        }
        if config.request_id.enabled {
            client = client.use_plugin(request_id::with_header(&config.request_id.header));
        }
        if config.cookies.jar {
            client = client.cookie_jar(CookieJar::new());
        }

        tracing::debug!(
            base_url = ?config.base_url,
            headers = config.headers.len(),
            request_timeout_ms = config.timeouts.request_ms,
            "Client configured"
        );
        Ok(client)
    }

    /// A new client inheriting from this one.
    pub fn derive(&self) -> Client {
        let mut child = Client {
            context: Context::inheriting(self.context.snapshot()),
            ..Client::new()
        };
        child.link_stack(self);
        child
    }

    /// Inherit `parent`'s stack and context as they are now.
    ///
    /// Request fields this client's template leaves unset are taken from
    /// `parent`'s. Fails with `InheritanceCycle` when `parent` is this client
    /// or one of its descendants.
    pub fn use_parent(mut self, parent: &Client) -> Result<Self> {
        self.context.link_parent(parent.context.snapshot())?;
        self.link_stack(parent);
        Ok(self)
    }

    fn link_stack(&mut self, parent: &Client) {
        let parent = Arc::new(parent.clone());
        self.middleware.inherit_from(parent.middleware.snapshot());
        self.parent = Some(parent);
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn parent(&self) -> Option<&Client> {
        self.parent.as_deref()
    }

    /// The context template inherited by requests.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Values set here are visible to requests derived afterwards.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// Own transport, else the nearest ancestor's.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.transport()))
    }

    /// A new request inheriting this client's stack and context.
    pub fn request(&self) -> Request {
        let transport = self.transport().unwrap_or_else(HyperTransport::shared);
        Request::inheriting(self.middleware.snapshot(), self.context.snapshot(), transport)
    }

    pub fn get(&self) -> Request {
        self.request().method(Method::GET)
    }

    pub fn post(&self) -> Request {
        self.request().method(Method::POST)
    }

    pub fn put(&self) -> Request {
        self.request().method(Method::PUT)
    }

    pub fn delete(&self) -> Request {
        self.request().method(Method::DELETE)
    }

    pub fn patch(&self) -> Request {
        self.request().method(Method::PATCH)
    }

    pub fn head(&self) -> Request {
        self.request().method(Method::HEAD)
    }

    pub fn options(&self) -> Request {
        self.request().method(Method::OPTIONS)
    }
}

impl Compose for Client {
    fn middleware_mut(&mut self) -> &mut Middleware {
        &mut self.middleware
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("context", &self.context.id())
            .field("middleware", &self.middleware)
            .field("has_parent", &self.parent.is_some())
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}
