//! One-shot deferred delivery scheduling.
//!
//! [`TokioScheduler`] spawns one timer task per [`DeferredDelivery`]. The task
//! sleeps for the delivery's delay, then makes a single send attempt through
//! its [`CallbackSender`]. Scheduled deliveries cannot be cancelled
//! individually; [`TokioScheduler::shutdown`] drops every delivery still
//! waiting on its timer.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::delivery::CallbackSender;

/// A payload to POST to `url` once `delay` has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredDelivery {
    pub url: String,
    pub payload: serde_json::Value,
    pub delay: Duration,
}

/// Accepts deliveries to run later. Scheduling never blocks and never fails
/// from the caller's point of view.
pub trait CallbackScheduler: Send + Sync {
    fn schedule(&self, delivery: DeferredDelivery);
}

/// Timer-task scheduler running on the ambient tokio runtime.
pub struct TokioScheduler {
    sender: Arc<dyn CallbackSender>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl TokioScheduler {
    pub fn new(sender: Arc<dyn CallbackSender>) -> Self {
        Self {
            sender,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Number of deliveries that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting deliveries, drop those still waiting on their timer and
    /// wait for in-flight sends to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl CallbackScheduler for TokioScheduler {
    fn schedule(&self, delivery: DeferredDelivery) {
        if self.cancel.is_cancelled() {
            tracing::warn!(url = %delivery.url, "Scheduler is shut down, callback not scheduled");
            return;
        }

        tracing::info!(
            url = %delivery.url,
            delay_secs = delivery.delay.as_secs_f64(),
            "Callback delivery scheduled"
        );

        let sender = Arc::clone(&self.sender);
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(url = %delivery.url, "Scheduler stopping, pending callback dropped");
                }
                _ = tokio::time::sleep(delivery.delay) => {
                    match sender.send(&delivery.url, &delivery.payload).await {
                        Ok(()) => tracing::info!(url = %delivery.url, "Callback delivered"),
                        Err(e) => tracing::warn!(url = %delivery.url, error = %e, "Callback delivery failed"),
                    }
                }
            }
        });
    }
}
