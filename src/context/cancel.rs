//! Cancellation signals.
//!
//! # Sources
//! - `CancelHandle` owned by the caller (e.g. tied to an inbound request)
//! - Deadlines, as attached by the timeout plugin
//! - `triggered()`, a signal that has already fired
//!
//! The engine only observes signals; it never fires or drops the caller's
//! handle.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, BoxFuture};
use tokio::sync::watch;
use tokio::time::Instant;

/// Caller-owned trigger for one or more [`CancelSignal`]s.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that fires when [`cancel`](Self::cancel) is called.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            kind: Kind::Handle(self.tx.subscribe()),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Triggered,
    Handle(watch::Receiver<bool>),
    Deadline(Instant),
    Any(Vec<CancelSignal>),
}

/// Read-only view of a cancellation source.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    kind: Kind,
}

impl CancelSignal {
    /// A signal that has already fired.
    pub fn triggered() -> Self {
        Self { kind: Kind::Triggered }
    }

    pub fn deadline(at: Instant) -> Self {
        Self {
            kind: Kind::Deadline(at),
        }
    }

    /// Deadline `after` from now.
    pub fn timeout(after: Duration) -> Self {
        Self::deadline(Instant::now() + after)
    }

    /// Fires when either `self` or `other` fires.
    pub fn or(self, other: CancelSignal) -> Self {
        let mut signals = match self.kind {
            Kind::Any(signals) => signals,
            kind => vec![CancelSignal { kind }],
        };
        signals.push(other);
        Self {
            kind: Kind::Any(signals),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.kind {
            Kind::Triggered => true,
            Kind::Handle(rx) => *rx.borrow(),
            Kind::Deadline(at) => Instant::now() >= *at,
            Kind::Any(signals) => signals.iter().any(CancelSignal::is_cancelled),
        }
    }

    /// Resolves once the signal fires. Never resolves if the owning handle
    /// is dropped without cancelling.
    pub fn wait(&self) -> BoxFuture<'static, ()> {
        match &self.kind {
            Kind::Triggered => Box::pin(future::ready(())),
            Kind::Handle(rx) => {
                let mut rx = rx.clone();
                Box::pin(async move {
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        future::pending::<()>().await;
                    }
                })
            }
            Kind::Deadline(at) => Box::pin(tokio::time::sleep_until(*at)),
            Kind::Any(signals) => Self::any(signals),
        }
    }

    /// Resolves once any of `signals` fires; pending forever when empty.
    pub fn any(signals: &[CancelSignal]) -> BoxFuture<'static, ()> {
        if signals.is_empty() {
            return Box::pin(future::pending());
        }
        let waits: Vec<_> = signals.iter().map(CancelSignal::wait).collect();
        Box::pin(async move {
            future::select_all(waits).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_fires_every_signal() {
        let handle = CancelHandle::new();
        let a = handle.signal();
        let b = handle.signal();
        assert!(!a.is_cancelled());

        handle.cancel();
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn deadline_expires() {
        let signal = CancelSignal::timeout(Duration::from_millis(20));
        assert!(!signal.is_cancelled());
        signal.wait().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn combined_signal_fires_on_first_source() {
        let handle = CancelHandle::new();
        let combined = handle.signal().or(CancelSignal::timeout(Duration::from_secs(60)));
        assert!(!combined.is_cancelled());

        let waiter = tokio::spawn(combined.wait());
        handle.cancel();
        waiter.await.unwrap();
        assert!(combined.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_handle_never_fires() {
        let signal = CancelHandle::new().signal();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.wait()).await;
        assert!(waited.is_err());
        assert!(!signal.is_cancelled());
    }
}
