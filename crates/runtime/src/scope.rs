//! Lifetimes for async work.
//!
//! A [`Scope`] belongs to whatever owns the state an operation writes to.
//! Work run through the scope yields `None` once it is closed, so the caller
//! never writes into disposed state.

use std::future::Future;

use tokio::sync::watch;

/// Owner side. Closing or dropping it ends the scope.
pub struct Scope {
    closed: watch::Sender<bool>,
    handle: ScopeHandle,
}

#[derive(Clone)]
pub struct ScopeHandle {
    closed: watch::Receiver<bool>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        let (closed, receiver) = watch::channel(false);
        Self {
            closed,
            handle: ScopeHandle { closed: receiver },
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        self.handle.run(work).await
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

impl ScopeHandle {
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.closed.has_changed().is_err()
    }

    /// Resolves once the scope is closed.
    pub async fn closed(&self) {
        let mut closed = self.closed.clone();
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Drive `work` while the scope is open. The output is discarded when the
    /// scope closes first, or closed while the work was finishing.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        if self.is_closed() {
            return None;
        }

        tokio::select! {
            output = work => (!self.is_closed()).then_some(output),
            _ = self.closed() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_open_scope_returns_output() {
        let scope = Scope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_closed_scope_skips_work() {
        let scope = Scope::new();
        scope.close();

        let mut ran = false;
        let output = scope.run(async { ran = true }).await;
        assert!(output.is_none());
        assert!(!ran);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_mid_flight_discards_result() {
        let scope = Scope::new();
        let handle = scope.handle();

        let task = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "stale"
                })
                .await
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(scope);
        assert_eq!(task.await.unwrap(), None);
    }
}
