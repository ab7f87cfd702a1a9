//! Background notification scheduler.
//!
//! A single self-rescheduling loop: sleep a freshly-drawn random delay, run
//! one pass over the subscription registry, repeat. Because the next delay is
//! drawn only after a pass completes, a slow pass can never stack executions.
//! The random delay spreads passes across deployments instead of
//! synchronizing them.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::db::Repository;
use crate::models::{PushPayload, RideStatus, Subscription};
use crate::push::{DeliveryError, PushTransport};

pub struct NotificationScheduler {
    repo: Arc<Repository>,
    transport: Arc<dyn PushTransport>,
    min_interval: Duration,
    max_interval: Duration,
}

impl NotificationScheduler {
    pub fn new(
        repo: Arc<Repository>,
        transport: Arc<dyn PushTransport>,
        min_interval: Duration,
        max_interval: Duration,
    ) -> Self {
        Self {
            repo,
            transport,
            min_interval,
            max_interval,
        }
    }

    /// Run until the shutdown signal flips. Owned by the process lifecycle;
    /// tests drive [`NotificationScheduler::tick`] directly instead.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let delay = self.next_delay();
            tracing::debug!("Next notification pass in {:?}", delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    tracing::info!("Notification scheduler stopping");
                    return;
                }
            }

            self.tick().await;
        }
    }

    /// One pass over the registry. Failures are isolated per subscription so
    /// one bad endpoint never aborts the remaining batch.
    pub async fn tick(&self) {
        let subscriptions = match self.repo.list_subscriptions().await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!("Notification pass skipped, registry read failed: {}", e);
                return;
            }
        };

        tracing::debug!("Notification pass over {} subscription(s)", subscriptions.len());

        for subscription in &subscriptions {
            if let Err(e) = self.process_subscription(subscription).await {
                tracing::warn!(
                    corrida_number = %subscription.corrida_number,
                    "Subscription pass failed: {}", e
                );
            }
        }
    }

    async fn process_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<(), crate::errors::AppError> {
        let ride = self
            .repo
            .get_ride_by_corrida(&subscription.corrida_number)
            .await?;

        // A subscription whose ride is missing or no longer Running is
        // stale; remove it without attempting delivery.
        let live = matches!(ride, Some(ref r) if r.status == RideStatus::Running);
        if !live {
            self.repo
                .remove_subscription(&subscription.corrida_number)
                .await?;
            tracing::info!(
                corrida_number = %subscription.corrida_number,
                "Pruned stale subscription"
            );
            return Ok(());
        }

        let payload = PushPayload::silent_resync(&subscription.corrida_number);
        match self.transport.send(subscription, &payload).await {
            Ok(()) => {
                tracing::debug!(
                    corrida_number = %subscription.corrida_number,
                    "Delivered resync notification"
                );
            }
            Err(DeliveryError::Permanent(msg)) => {
                tracing::info!(
                    corrida_number = %subscription.corrida_number,
                    "Pruning invalid endpoint: {}", msg
                );
                self.repo.prune_endpoint(&subscription.endpoint).await?;
            }
            Err(DeliveryError::Transient(msg)) => {
                // Left for the next pass; no inline retry.
                tracing::warn!(
                    corrida_number = %subscription.corrida_number,
                    "Delivery failed, will retry next pass: {}", msg
                );
            }
        }

        Ok(())
    }

    fn next_delay(&self) -> Duration {
        if self.max_interval <= self.min_interval {
            return self.min_interval;
        }
        rand::thread_rng().gen_range(self.min_interval..=self.max_interval)
    }
}
