//! Builder methods shared by `Client` and `Request`.
//!
//! Every method registers a handler or a plugin; none of them touches the
//! context directly. On a `Client` the registration applies to every request
//! derived afterwards, on a `Request` only to that request, after everything
//! it inherited.

use std::time::Duration;

use axum::body::Bytes;
use hyper::Method;
use serde::Serialize;

use crate::context::{CancelSignal, Context};
use crate::error::Result;
use crate::http::Cookie;
use crate::middleware::{handler, Middleware, Next, Phase, Plugin};
use crate::plugins::cookies::CookieJar;
use crate::plugins::{body, cookies, headers, request_id, timeout, url};

/// Fluent registration on a middleware stack.
pub trait Compose: Sized {
    /// The stack new handlers are appended to.
    fn middleware_mut(&mut self) -> &mut Middleware;

    fn use_plugin(mut self, plugin: Plugin) -> Self {
        self.middleware_mut().use_plugin(plugin);
        self
    }

    fn use_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.middleware_mut().use_request(f);
        self
    }

    fn use_response<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.middleware_mut().use_response(f);
        self
    }

    fn use_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.middleware_mut().use_error(f);
        self
    }

    fn use_handler<F>(mut self, phase: Phase, f: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.middleware_mut().use_phase(phase, handler(f));
        self
    }

    /// Register for a phase given by name; fails with `InvalidPhase`.
    fn use_handler_name<F>(mut self, phase: &str, f: F) -> Result<Self>
    where
        F: Fn(&mut Context, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.middleware_mut().use_phase_name(phase, handler(f))?;
        Ok(self)
    }

    fn method(self, method: Method) -> Self {
        self.use_plugin(url::method(method))
    }

    /// Absolute URL, or a path with optional query string.
    fn url(self, uri: &str) -> Self {
        self.use_plugin(url::url(uri))
    }

    fn base_url(self, uri: &str) -> Self {
        self.use_plugin(url::base_url(uri))
    }

    fn path(self, path: &str) -> Self {
        self.use_plugin(url::path(path))
    }

    fn add_path(self, path: &str) -> Self {
        self.use_plugin(url::add_path(path))
    }

    fn param(self, name: &str, value: &str) -> Self {
        self.use_plugin(url::param(name, value))
    }

    fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.use_plugin(url::params(params))
    }

    fn query(self, key: &str, value: &str) -> Self {
        self.use_plugin(url::query(key, value))
    }

    fn set_header(self, name: &str, value: &str) -> Self {
        self.use_plugin(headers::set(name, value))
    }

    fn add_header(self, name: &str, value: &str) -> Self {
        self.use_plugin(headers::add(name, value))
    }

    fn set_headers<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.use_plugin(headers::set_map(fields))
    }

    fn add_cookie(self, cookie: Cookie) -> Self {
        self.use_plugin(cookies::add(cookie))
    }

    fn add_cookies(self, data: Vec<Cookie>) -> Self {
        self.use_plugin(cookies::add_multiple(data))
    }

    /// Share `jar` between every request dispatched through this builder.
    fn cookie_jar(self, jar: CookieJar) -> Self {
        self.use_plugin(cookies::jar(jar))
    }

    /// Observe an externally owned cancellation signal.
    fn use_cancel_signal(self, signal: CancelSignal) -> Self {
        self.use_plugin(timeout::cancel_signal(signal))
    }

    fn timeout(self, after: Duration) -> Self {
        self.use_plugin(timeout::plugin(after))
    }

    fn request_id(self) -> Self {
        self.use_plugin(request_id::plugin())
    }

    fn body_text(self, text: impl Into<String>) -> Self {
        self.use_plugin(body::text(text))
    }

    fn body_bytes(self, bytes: impl Into<Bytes>) -> Self {
        self.use_plugin(body::bytes(bytes))
    }

    fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.use_plugin(body::json(value))
    }
}
