//! Per-call statistics and cancellation plumbing.

use tokio::sync::watch;

/// Per-call facts for application-side logging and orchestration.
#[derive(Debug, Clone, Default)]
pub struct CallStats {
    /// Resolved model the call was made (or cached) for.
    pub model: String,
    /// HTTP status of the final attempt; `None` on cache hits.
    pub http_status: Option<u16>,
    /// Number of retries performed after the first attempt.
    pub retry_count: u32,
    pub duration_ms: u128,
    pub cache_hit: bool,
    /// Correlation id sent as `x-request-id`; `None` on cache hits.
    pub client_request_id: Option<String>,
}

/// Handle for aborting an in-flight generate call.
///
/// Cancelling aborts the HTTP attempt, surfaces [`crate::Error::Cancelled`]
/// to the caller, and never populates the cache. Dropping the handle
/// without cancelling lets the call run to completion.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiving side, held by the executing call.
#[derive(Debug)]
pub(crate) struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once the paired handle cancels. If every handle is dropped
    /// without cancelling, this never resolves and the call proceeds.
    pub(crate) async fn cancelled(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
        futures::future::pending::<()>().await
    }
}

pub(crate) fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_resolves_the_signal() {
        let (handle, mut signal) = cancel_pair();
        assert!(!handle.is_cancelled());
        handle.cancel();
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("signal should resolve after cancel");
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_handle_never_resolves() {
        let (handle, mut signal) = cancel_pair();
        drop(handle);
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), signal.cancelled()).await;
        assert!(timed_out.is_err());
    }
}
