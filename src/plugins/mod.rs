//! Stock plugins.
//!
//! Each builder method on `Client` and `Request` is a thin wrapper that
//! registers one of these plugins. Everything a plugin does happens inside a
//! handler at dispatch time, so the same mutation is replayed for every
//! request derived from a client.
//!
//! Inputs are parsed when the plugin is built; a bad input is kept and
//! raised from the handler, so it surfaces through the error phase.

pub mod body;
pub mod cookies;
pub mod headers;
pub mod request_id;
pub mod timeout;
pub mod url;
