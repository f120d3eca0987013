//! Header plugins.

use hyper::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::middleware::Plugin;

fn parse(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

/// Set `name`, replacing existing values.
pub fn set(name: &str, value: &str) -> Plugin {
    let parsed = parse(name, value);
    Plugin::request("headers.set", move |ctx, next| {
        let (name, value) = parsed.clone()?;
        ctx.request.headers.insert(name, value);
        next.run(ctx)
    })
}

/// Append a value to `name`, keeping existing ones.
pub fn add(name: &str, value: &str) -> Plugin {
    let parsed = parse(name, value);
    Plugin::request("headers.add", move |ctx, next| {
        let (name, value) = parsed.clone()?;
        ctx.request.headers.append(name, value);
        next.run(ctx)
    })
}

/// Set every pair of `fields`, replacing existing values.
pub fn set_map<I, K, V>(fields: I) -> Plugin
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let parsed: Result<Vec<_>> = fields
        .into_iter()
        .map(|(k, v)| parse(k.as_ref(), v.as_ref()))
        .collect();
    Plugin::request("headers.set_map", move |ctx, next| {
        for (name, value) in parsed.clone()? {
            ctx.request.headers.insert(name, value);
        }
        next.run(ctx)
    })
}

/// Remove `name` from the outgoing request.
pub fn remove(name: &str) -> Plugin {
    let name = name.to_string();
    Plugin::request("headers.remove", move |ctx, next| {
        ctx.request.headers.remove(name.as_str());
        next.run(ctx)
    })
}
