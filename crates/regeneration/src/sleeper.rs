//! Waiting between status queries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current task for a duration.
///
/// The poller never sleeps on its own; production code passes
/// [`TokioSleeper`], tests pass a recorder that returns immediately.
#[async_trait]
pub trait Sleeper: Send + Sync + 'static {
    async fn sleep(&self, duration: Duration);
}

/// Timer-backed sleeper (yields to the runtime, does not block a thread).
#[derive(Debug, Copy, Clone, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}
