//! Per-campaign status polling

use crate::registry::CampaignRegistry;
use leadflow_client::ApiClient;
use leadflow_common::types::{CampaignId, CampaignStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// How a polling loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The campaign reached a terminal status and the registry holds the
    /// fully reloaded snapshot
    Resolved(CampaignStatus),
    /// The ceiling elapsed without a terminal status; the last observed
    /// snapshot stays in place
    TimedOut,
}

/// Watches in-flight campaigns until they settle.
///
/// One task per campaign; re-watching a campaign aborts the previous task
/// first. Requests inside a task are strictly sequential.
pub struct StatusPoller {
    client: Arc<ApiClient>,
    registry: Arc<CampaignRegistry>,
    interval: Duration,
    ceiling: Duration,
    tasks: Mutex<HashMap<CampaignId, JoinHandle<PollOutcome>>>,
}

impl StatusPoller {
    pub fn new(client: Arc<ApiClient>, registry: Arc<CampaignRegistry>) -> Self {
        Self {
            client,
            registry,
            interval: Duration::from_secs(3),
            ceiling: Duration::from_secs(120),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Set the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the give-up ceiling
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Start (or restart) polling a campaign
    pub async fn watch(self: &Arc<Self>, id: CampaignId) {
        let mut tasks = self.tasks.lock().await;
        if let Some(prev) = tasks.remove(&id) {
            prev.abort();
            debug!(campaign_id = %id, "previous polling task aborted");
        }

        let poller = Arc::clone(self);
        let handle = tokio::spawn(async move { poller.poll_loop(id).await });
        tasks.insert(id, handle);
    }

    async fn poll_loop(&self, id: CampaignId) -> PollOutcome {
        let deadline = Instant::now() + self.ceiling;
        debug!(campaign_id = %id, "polling started");

        loop {
            let wake = Instant::now() + self.interval;
            if wake > deadline {
                warn!(campaign_id = %id, "polling gave up after {:?}", self.ceiling);
                return PollOutcome::TimedOut;
            }
            tokio::time::sleep_until(wake).await;

            let snapshot = match self.client.fetch_status(id).await {
                Ok(snapshot) => snapshot,
                Err(e) if e.is_transient() => {
                    warn!(campaign_id = %id, error = %e, "status poll tick failed, retrying");
                    continue;
                }
                Err(e) => {
                    // The deadline still governs; a later tick may see the
                    // campaign again after server-side cleanup
                    error!(campaign_id = %id, code = e.code(), error = %e, "status poll tick failed");
                    continue;
                }
            };

            if snapshot.status.is_terminal() {
                match self.client.get_campaign(id).await {
                    Ok(detail) => {
                        self.registry.apply_reconciled(detail).await;
                        info!(campaign_id = %id, status = %snapshot.status, "campaign settled");
                        return PollOutcome::Resolved(snapshot.status);
                    }
                    Err(e) => {
                        // Next tick will observe the terminal status again
                        warn!(campaign_id = %id, error = %e, "terminal reload failed");
                    }
                }
            } else {
                self.registry.apply_poll(id, &snapshot).await;
            }
        }
    }

    /// Detach the task for a campaign and await its outcome
    pub async fn wait(&self, id: CampaignId) -> Option<PollOutcome> {
        let handle = self.tasks.lock().await.remove(&id)?;
        handle.await.ok()
    }

    /// Stop polling a campaign
    pub async fn stop(&self, id: CampaignId) {
        if let Some(handle) = self.tasks.lock().await.remove(&id) {
            handle.abort();
        }
    }

    /// Abort every polling task
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }

    /// Number of polling tasks still running
    pub async fn active(&self) -> usize {
        self.tasks
            .lock()
            .await
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }
}
