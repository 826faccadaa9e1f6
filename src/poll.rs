//! Interval-driven background refresh
//!
//! Stands in for push updates: a task re-invokes a fetch function on a
//! fixed interval until its cancellation token fires.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest interval a poller will run at
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// A running background refresh task. Dropping it stops the task.
pub struct Poller {
    name: &'static str,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Run `tick` immediately and then every `interval`.
    ///
    /// Errors are logged and the loop keeps going. Intervals below
    /// [`MIN_INTERVAL`] are raised to it.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        if interval < MIN_INTERVAL {
            tracing::warn!("{} poll interval {:?} too short, using {:?}", name, interval, MIN_INTERVAL);
        }
        let interval = interval.max(MIN_INTERVAL);
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = tick().await {
                            tracing::warn!("{} refresh failed: {:#}", name, e);
                        }
                    }
                }
            }
            tracing::debug!("{} poller stopped", name);
        });

        Self { name, cancel_token, handle: Some(handle) }
    }

    /// Task name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the task to stop after its current tick
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stop and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let poller = Poller::spawn("test", Duration::from_secs(30), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });

        tokio::time::sleep(Duration::from_secs(65)).await;
        poller.shutdown().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_raised_to_minimum() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let poller = Poller::spawn("zero", Duration::ZERO, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let handle = poller.handle.as_ref().map(|h| h.is_finished());
        poller.shutdown().await;
        assert_eq!(handle, Some(false));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_do_not_stop_the_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let poller = Poller::spawn("failing", Duration::from_secs(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(anyhow::anyhow!("offline"))
            }
        });

        tokio::time::sleep(Duration::from_secs(25)).await;
        poller.shutdown().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
