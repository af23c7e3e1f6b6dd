// Work simulation - stands in for the real per-item computation

use async_trait::async_trait;
use std::time::Duration;

/// Cost paid once per processed item.
#[async_trait]
pub trait WorkSimulator: Send + Sync {
    async fn simulate(&self, delay: Duration);
}

/// Suspends the task for the full delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepWork;

#[async_trait]
impl WorkSimulator for SleepWork {
    async fn simulate(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Completes immediately, whatever the delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantWork;

#[async_trait]
impl WorkSimulator for InstantWork {
    async fn simulate(&self, _delay: Duration) {}
}
