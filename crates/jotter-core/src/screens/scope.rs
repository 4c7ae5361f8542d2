//! Screen lifetime and cancellation of in-flight requests.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation signal tied to a mounted screen.
///
/// Clones share the signal, so another task can unmount the screen while one
/// of its handlers is awaiting the backend. A cancelled request future is
/// dropped before completion and its result never reaches screen state.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Re-arm after a remount.
    pub fn reset(&self) {
        self.cancelled.send_replace(false);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Drive `future` unless the scope is cancelled first.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        let mut receiver = self.cancelled.subscribe();
        if *receiver.borrow_and_update() {
            return None;
        }

        tokio::select! {
            biased;
            _ = receiver.wait_for(|cancelled| *cancelled) => None,
            output = future => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn run_completes_when_not_cancelled() {
        let scope = ScreenScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancel_drops_pending_future() {
        let scope = ScreenScope::new();
        let remote = scope.clone();

        let (outcome, ()) = tokio::join!(
            scope.run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                1
            }),
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                remote.cancel();
            }
        );
        assert_eq!(outcome, None);
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_scope_skips_new_work_until_reset() {
        let scope = ScreenScope::new();
        scope.cancel();
        assert_eq!(scope.run(async { 1 }).await, None);

        scope.reset();
        assert_eq!(scope.run(async { 2 }).await, Some(2));
    }
}
