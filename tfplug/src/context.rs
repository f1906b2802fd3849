//! Request-scoped context carrying cancellation and deadlines
//!
//! Every trait method receives a `Context`. The gRPC layer creates one per
//! RPC and cancels it when the provider is asked to stop.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Context carries request-scoped cancellation signals and deadlines
/// CRITICAL: Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done_rx: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_deadline(None)
    }

    fn with_deadline(deadline: Option<Instant>) -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline,
                done_rx,
                done_tx,
            }),
        }
    }

    /// Derive a context that is cancelled once `timeout` has elapsed
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let ctx = Self::with_deadline(Some(deadline));

        let tx = ctx.inner.done_tx.clone();
        let mut parent = self.done();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline.into()) => {}
                _ = parent.wait_for(|cancelled| *cancelled) => {}
            }
            let _ = tx.send(true);
        });

        ctx
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done_rx.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver flipped to `true` once the context is cancelled
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done_rx.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
