//! Ownership scope for in-flight backend calls.
//!
//! Each admin workspace owns one [`ViewScope`]. Cancelling
//! the scope resolves every pending [`ViewScope::run`] to `None`, so a response
//! that arrives after the view is gone is dropped instead of applied.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Awaits `fut` unless the scope is cancelled first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_when_alive() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_is_discarded() {
        let scope = ViewScope::new();
        let canceller = scope.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                "stale"
            })
            .await;

        assert_eq!(result, None);
        assert!(scope.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scope_never_polls_work() {
        let scope = ViewScope::new();
        scope.cancel();
        assert_eq!(scope.run(async { 1 }).await, None);
    }
}
