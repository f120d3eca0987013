//! Middleware phases.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the three stages a dispatch passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before the transport call and finalizes the outgoing request.
    Request,
    /// Runs after the transport returned a response.
    Response,
    /// Runs when any earlier stage failed or was cancelled.
    Error,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Request, Phase::Response, Phase::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Request => "request",
            Phase::Response => "response",
            Phase::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "request" => Ok(Phase::Request),
            "response" => Ok(Phase::Response),
            "error" => Ok(Phase::Error),
            _ => Err(Error::InvalidPhase(name.to_string())),
        }
    }
}
