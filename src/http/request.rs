//! Outgoing request representation.
//!
//! # Responsibilities
//! - Hold the request fields that handlers mutate during the request phase
//! - Resolve origin, path and query into one absolute URL at dispatch time
//! - Fold cookies into a single `Cookie` header, after any value set directly
//!
//! # Design Decisions
//! - Origin (scheme, host, port) and path are stored apart so a parent can
//!   set the base URL while a child only sets the path
//! - Resolution failures surface as `InvalidUrl` and go through the error phase

use axum::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, COOKIE};
use hyper::Method;
use url::Url;

use crate::error::{Error, Result};

/// A single `name=value` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the leading `name=value` pair of a `Set-Cookie` header value.
    ///
    /// Attributes (`Path`, `Expires`, ...) are ignored.
    pub fn parse_set_cookie(raw: &str) -> Option<Cookie> {
        let pair = raw.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Cookie::new(name, value.trim().trim_matches('"')))
    }
}

/// The in-flight request that request-phase handlers build up.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    /// Scheme, host and port. Any path on this URL is ignored.
    pub origin: Option<Url>,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie>,
    pub body: Option<Bytes>,
}

impl Default for OutgoingRequest {
    fn default() -> Self {
        Self {
            method: Method::GET,
            origin: None,
            path: "/".to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: None,
        }
    }
}

impl OutgoingRequest {
    /// Absolute URL of this request.
    pub fn url(&self) -> Result<Url> {
        let origin = self
            .origin
            .as_ref()
            .ok_or_else(|| Error::InvalidUrl(format!("no base URL set for path {}", self.path)))?;

        let mut url = origin.clone();
        url.set_fragment(None);
        url.set_query(None);
        url.set_path(&normalize_path(&self.path));
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }

    /// Fill every field still at its default from `parent`.
    ///
    /// `GET` and `/` count as unset. Parent headers are added only under
    /// names this request does not carry; parent query pairs it lacks come
    /// first, so inheriting twice from the same parent changes nothing.
    pub fn inherit_from(&mut self, parent: &OutgoingRequest) {
        if self.method == Method::GET {
            self.method = parent.method.clone();
        }
        if self.origin.is_none() {
            self.origin = parent.origin.clone();
        }
        if self.path == "/" {
            self.path = parent.path.clone();
        }
        let own = std::mem::take(&mut self.query);
        let own_ref = own.clone();
        self.query = parent
            .query
            .iter()
            .filter(|pair| !own_ref.contains(pair))
            .cloned()
            .chain(own)
            .collect();
        for name in parent.headers.keys() {
            if !self.headers.contains_key(name) {
                for value in parent.headers.get_all(name) {
                    self.headers.append(name.clone(), value.clone());
                }
            }
        }
        for cookie in &parent.cookies {
            self.add_cookie(cookie.clone());
        }
        if self.body.is_none() {
            self.body = parent.body.clone();
        }
    }

    /// Add a cookie unless one with the same name is already present.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        if !self.cookies.iter().any(|c| c.name == cookie.name) {
            self.cookies.push(cookie);
        }
    }

    /// Freeze into the representation handed to the transport.
    pub fn resolve(&self) -> Result<ResolvedRequest> {
        let url = self.url()?;
        let mut headers = self.headers.clone();

        if !self.cookies.is_empty() {
            let mut pairs: Vec<String> = headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(str::to_string)
                .collect();
            pairs.extend(self.cookies.iter().map(|c| format!("{}={}", c.name, c.value)));
            let joined = pairs.join("; ");
            let value = HeaderValue::from_str(&joined).map_err(|e| Error::InvalidHeader {
                name: COOKIE.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(COOKIE, value);
        }

        Ok(ResolvedRequest {
            method: self.method.clone(),
            url,
            headers,
            body: self.body.clone().unwrap_or_default(),
        })
    }
}

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Collapse duplicate slashes and guarantee a leading one.
pub(crate) fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') && !segments.is_empty() {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origin(origin: &str, path: &str) -> OutgoingRequest {
        OutgoingRequest {
            origin: Some(Url::parse(origin).unwrap()),
            path: path.to_string(),
            ..OutgoingRequest::default()
        }
    }

    #[test]
    fn resolves_origin_path_and_query() {
        let mut req = with_origin("http://api.local:8080", "/v1//accounts");
        req.query.push(("page".into(), "2".into()));

        let url = req.url().unwrap();
        assert_eq!(url.as_str(), "http://api.local:8080/v1/accounts?page=2");
    }

    #[test]
    fn missing_origin_is_an_invalid_url() {
        let req = OutgoingRequest {
            path: "/accounts".into(),
            ..OutgoingRequest::default()
        };
        assert!(matches!(req.url(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn cookies_are_folded_into_one_header() {
        let mut req = with_origin("http://localhost", "/");
        req.add_cookie(Cookie::new("session", "abc"));
        req.add_cookie(Cookie::new("theme", "dark"));
        req.add_cookie(Cookie::new("session", "ignored"));

        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.headers[COOKIE], "session=abc; theme=dark");
        assert!(resolved.body.is_empty());
    }

    #[test]
    fn explicit_cookie_header_is_kept_ahead_of_cookies() {
        let mut req = with_origin("http://localhost", "/");
        req.headers.insert(COOKIE, HeaderValue::from_static("legacy=1"));
        req.add_cookie(Cookie::new("session", "abc"));

        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.headers.get_all(COOKIE).iter().count(), 1);
        assert_eq!(resolved.headers[COOKIE], "legacy=1; session=abc");
    }

    #[test]
    fn inherits_only_unset_fields() {
        let mut parent = with_origin("http://api.local", "/v1");
        parent.method = Method::POST;
        parent.query.push(("tenant".into(), "acme".into()));
        parent.headers.insert("x-trace", HeaderValue::from_static("1"));
        parent.headers.insert("x-service", HeaderValue::from_static("base"));
        parent.add_cookie(Cookie::new("sid", "parent"));
        parent.body = Some(Bytes::from_static(b"parent"));

        let mut child = OutgoingRequest::default();
        child.query.push(("page".into(), "2".into()));
        child.headers.insert("x-service", HeaderValue::from_static("billing"));
        child.add_cookie(Cookie::new("sid", "child"));
        child.inherit_from(&parent);

        assert_eq!(child.method, Method::POST);
        assert_eq!(child.url().unwrap().as_str(), "http://api.local/v1?tenant=acme&page=2");
        assert_eq!(child.headers["x-trace"], "1");
        assert_eq!(child.headers["x-service"], "billing");
        assert_eq!(child.cookies, vec![Cookie::new("sid", "child")]);
        assert_eq!(child.body.as_deref(), Some(&b"parent"[..]));

        let mut fresh = OutgoingRequest::default();
        fresh.inherit_from(&parent);
        assert_eq!(fresh.url().unwrap(), parent.url().unwrap());
        assert_eq!(fresh.headers, parent.headers);
    }

    #[test]
    fn parses_set_cookie_values() {
        let cookie = Cookie::parse_set_cookie("id=a3fWa; Expires=Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(cookie, Cookie::new("id", "a3fWa"));
        assert!(Cookie::parse_set_cookie("=nothing").is_none());
        assert!(Cookie::parse_set_cookie("garbage").is_none());
    }

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("a/b"), "/a/b");
        assert_eq!(normalize_path("/a/b/"), "/a/b/");
    }
}
