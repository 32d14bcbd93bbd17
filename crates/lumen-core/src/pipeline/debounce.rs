//! Debounce gate for preview regeneration.
//!
//! Slider drags fire far faster than previews render. Each edit takes a new
//! generation token; a render pass waits out the debounce window, then checks
//! its token is still the latest before starting and again before publishing.
//! Stale passes drop their work, so the last edit always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monotonic generation counter shared by all preview passes for one session.
#[derive(Debug, Clone, Default)]
pub struct PreviewGate {
    generation: Arc<AtomicU64>,
}

impl PreviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new edit and return its token. Any pass holding an older
    /// token is now stale.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while `token` is still the newest edit.
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Wait out the debounce window, then run `render` only if no newer edit
    /// arrived in the meantime. Returns `None` when the pass was superseded,
    /// either during the wait or while rendering.
    pub async fn debounced<F, Fut, T>(
        &self,
        token: u64,
        delay: Duration,
        render: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        tokio::time::sleep(delay).await;
        if !self.is_current(token) {
            return None;
        }
        let result = render().await;
        if !self.is_current(token) {
            return None;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_token_invalidates_older() {
        let gate = PreviewGate::new();
        let first = gate.begin();
        assert!(gate.is_current(first));

        let second = gate.begin();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_uninterrupted_pass_publishes() {
        let gate = PreviewGate::new();
        let token = gate.begin();
        let result = gate
            .debounced(token, Duration::from_millis(150), || async { 42 })
            .await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_during_wait_drops_work() {
        let gate = PreviewGate::new();
        let token = gate.begin();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.debounced(token, Duration::from_millis(150), || async { 42 })
                    .await
            })
        };

        // A new edit lands inside the debounce window
        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.begin();

        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_during_render_drops_result() {
        let gate = PreviewGate::new();
        let token = gate.begin();

        let inner = gate.clone();
        let result = gate
            .debounced(token, Duration::from_millis(150), || async move {
                // Edit arrives while the render is in flight
                inner.begin();
                42
            })
            .await;
        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_only_last_wins() {
        let gate = PreviewGate::new();
        let mut handles = Vec::new();
        for value in 0..5 {
            let token = gate.begin();
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.debounced(token, Duration::from_millis(150), || async move { value })
                    .await
            }));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let mut published = Vec::new();
        for handle in handles {
            if let Some(value) = handle.await.unwrap() {
                published.push(value);
            }
        }
        assert_eq!(published, vec![4]);
    }
}
