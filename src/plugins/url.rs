//! URL and method plugins.
//!
//! A parent usually sets the base URL and a child sets or extends the path;
//! `param` then fills `:name` placeholders in whatever path is current when
//! it runs.

use hyper::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::error::{Error, Result};
use crate::middleware::Plugin;

pub fn method(method: Method) -> Plugin {
    Plugin::request("method", move |ctx, next| {
        ctx.request.method = method.clone();
        next.run(ctx)
    })
}

fn parse_absolute(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).map_err(|e| Error::InvalidUrl(format!("{uri}: {e}")))?;
    if !url.has_host() {
        return Err(Error::InvalidUrl(format!("{uri}: missing host")));
    }
    Ok(url)
}

fn split_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Absolute URLs set origin, path and query. Anything else is taken as a
/// path with an optional query string.
pub fn url(uri: &str) -> Plugin {
    let target = match Url::parse(uri) {
        Ok(parsed) if parsed.has_host() => Ok(Target::Absolute(parsed)),
        Ok(_) => Err(Error::InvalidUrl(format!("{uri}: missing host"))),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
            Ok(Target::Relative {
                path: path.to_string(),
                query: split_query(query),
            })
        }
        Err(e) => Err(Error::InvalidUrl(format!("{uri}: {e}"))),
    };

    Plugin::request("url", move |ctx, next| {
        match target.clone()? {
            Target::Absolute(parsed) => {
                ctx.request.path = parsed.path().to_string();
                ctx.request.query = parsed.query().map(split_query).unwrap_or_default();
                ctx.request.origin = Some(parsed);
            }
            Target::Relative { path, query } => {
                ctx.request.path = path;
                ctx.request.query.extend(query);
            }
        }
        next.run(ctx)
    })
}

#[derive(Clone)]
enum Target {
    Absolute(Url),
    Relative {
        path: String,
        query: Vec<(String, String)>,
    },
}

/// Set scheme, host and port, and use the URL's path as the base path.
pub fn base_url(uri: &str) -> Plugin {
    let parsed = parse_absolute(uri);
    Plugin::request("url.base", move |ctx, next| {
        let parsed = parsed.clone()?;
        ctx.request.path = parsed.path().to_string();
        ctx.request.origin = Some(parsed);
        next.run(ctx)
    })
}

/// Replace the path.
pub fn path(path: &str) -> Plugin {
    let path = path.to_string();
    Plugin::request("url.path", move |ctx, next| {
        ctx.request.path = path.clone();
        next.run(ctx)
    })
}

/// Append `path` to the current path.
pub fn add_path(path: &str) -> Plugin {
    let suffix = path.trim_start_matches('/').to_string();
    Plugin::request("url.add_path", move |ctx, next| {
        let base = ctx.request.path.trim_end_matches('/');
        ctx.request.path = format!("{base}/{suffix}");
        next.run(ctx)
    })
}

// Characters that would otherwise split or end a path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Replace the `:name` path segment with `value`, percent-encoded so it stays
/// one segment.
pub fn param(name: &str, value: &str) -> Plugin {
    params([(name, value)])
}

pub fn params<I, K, V>(params: I) -> Plugin
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| {
            let value = utf8_percent_encode(v.as_ref(), PATH_SEGMENT_ENCODE_SET).to_string();
            (format!(":{}", k.as_ref()), value)
        })
        .collect();
    Plugin::request("url.params", move |ctx, next| {
        let replaced: Vec<&str> = ctx
            .request
            .path
            .split('/')
            .map(|segment| {
                params
                    .iter()
                    .find(|(placeholder, _)| placeholder == segment)
                    .map_or(segment, |(_, value)| value.as_str())
            })
            .collect();
        ctx.request.path = replaced.join("/");
        next.run(ctx)
    })
}

/// Append a query pair.
pub fn query(key: &str, value: &str) -> Plugin {
    let pair = (key.to_string(), value.to_string());
    Plugin::request("url.query", move |ctx, next| {
        ctx.request.query.push(pair.clone());
        next.run(ctx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::middleware::{Middleware, Phase};

    fn resolve(plugins: Vec<Plugin>) -> Result<Context> {
        let mut stack = Middleware::new();
        for plugin in plugins {
            stack.use_plugin(plugin);
        }
        let mut ctx = Context::new();
        stack.run_phase(Phase::Request, &mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn base_url_then_relative_url() {
        let ctx = resolve(vec![
            base_url("http://api.local/v1"),
            url("/accounts?limit=5"),
            method(Method::GET),
        ])
        .unwrap();

        assert_eq!(ctx.request.path, "/accounts");
        assert_eq!(ctx.request.url().unwrap().as_str(), "http://api.local/accounts?limit=5");
    }

    #[test]
    fn add_path_and_params() {
        let ctx = resolve(vec![
            base_url("http://api.local/v1/"),
            add_path("/users/:id/posts/:postId"),
            param("id", "42"),
            params([("postId", "7"), ("unused", "x")]),
            query("sort", "desc"),
        ])
        .unwrap();

        assert_eq!(ctx.request.path, "/v1/users/42/posts/7");
        assert_eq!(
            ctx.request.url().unwrap().as_str(),
            "http://api.local/v1/users/42/posts/7?sort=desc"
        );
    }

    #[test]
    fn param_matches_whole_segments_only() {
        let ctx = resolve(vec![path("/:id/:identity"), param("id", "1")]).unwrap();
        assert_eq!(ctx.request.path, "/1/:identity");
    }

    #[test]
    fn param_values_stay_in_one_segment() {
        let ctx = resolve(vec![
            base_url("http://api.local"),
            path("/files/:name/meta"),
            param("name", "a/b?c#d e"),
        ])
        .unwrap();

        assert_eq!(ctx.request.path, "/files/a%2Fb%3Fc%23d%20e/meta");
        assert_eq!(
            ctx.request.url().unwrap().as_str(),
            "http://api.local/files/a%2Fb%3Fc%23d%20e/meta"
        );
    }

    #[test]
    fn absolute_url_replaces_origin_and_query() {
        let ctx = resolve(vec![
            base_url("http://old.local"),
            query("stale", "1"),
            url("https://new.local:8443/a/b?x=1"),
        ])
        .unwrap();

        assert_eq!(ctx.request.url().unwrap().as_str(), "https://new.local:8443/a/b?x=1");
    }

    #[test]
    fn base_url_must_be_absolute() {
        let err = resolve(vec![base_url("/relative")]).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
