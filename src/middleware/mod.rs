//! Phase-aware middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Client / Request builders
//!     → plugin.rs (bundle of phase + handler pairs)
//!     → stack.rs (per-phase local sequences + parent snapshot)
//!
//! On dispatch:
//!     stack.effective_sequence(phase)
//!     → ancestors first, registration order within a level
//!     → handler.rs (chain execution through `Next`)
//!     → PhaseOutcome::Completed | PhaseOutcome::Stopped | Err(Error)
//! ```
//!
//! # Design Decisions
//! - Phases are a closed enum; string names only at the plugin edge
//! - Parents are immutable `Arc` snapshots, so dispatch never locks
//! - Handlers are synchronous; the only suspension point is the transport

pub mod handler;
pub mod phase;
pub mod plugin;
pub mod stack;

pub use handler::{handler, Handler, Next, PhaseOutcome};
pub use phase::Phase;
pub use plugin::Plugin;
pub use stack::Middleware;
