//! Cookie plugins and the shared cookie jar.

use std::sync::Arc;

use dashmap::DashMap;
use hyper::header::SET_COOKIE;

use crate::http::Cookie;
use crate::middleware::Plugin;

/// Add `cookie` unless the request already carries one with that name.
pub fn add(cookie: Cookie) -> Plugin {
    Plugin::request("cookies.add", move |ctx, next| {
        ctx.request.add_cookie(cookie.clone());
        next.run(ctx)
    })
}

pub fn add_multiple(cookies: Vec<Cookie>) -> Plugin {
    Plugin::request("cookies.add_multiple", move |ctx, next| {
        for cookie in &cookies {
            ctx.request.add_cookie(cookie.clone());
        }
        next.run(ctx)
    })
}

/// Cookies captured from `Set-Cookie` responses, shared by every request
/// that uses the same jar.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, cookie: Cookie) {
        self.cookies.insert(cookie.name, cookie.value);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|v| v.value().clone())
    }

    /// Snapshot of the stored cookies, sorted by name.
    pub fn cookies(&self) -> Vec<Cookie> {
        let mut cookies: Vec<Cookie> = self
            .cookies
            .iter()
            .map(|entry| Cookie::new(entry.key().clone(), entry.value().clone()))
            .collect();
        cookies.sort_by(|a, b| a.name.cmp(&b.name));
        cookies
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&self) {
        self.cookies.clear();
    }
}

/// Replay jar cookies on requests and capture `Set-Cookie` from responses.
pub fn jar(jar: CookieJar) -> Plugin {
    let outgoing = jar.clone();
    Plugin::new("cookies.jar")
        .on_request(move |ctx, next| {
            for cookie in outgoing.cookies() {
                ctx.request.add_cookie(cookie);
            }
            next.run(ctx)
        })
        .on_response(move |ctx, next| {
            if let Some(response) = &ctx.response {
                let captured = response
                    .headers
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .filter_map(Cookie::parse_set_cookie);
                for cookie in captured {
                    tracing::trace!(cookie = %cookie.name, "Stored cookie");
                    jar.store(cookie);
                }
            }
            next.run(ctx)
        })
}
