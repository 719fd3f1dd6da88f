//! In-memory campaign registry shared by dispatch, polling and coordinators

use leadflow_common::types::{
    Campaign, CampaignDetail, CampaignId, CampaignStatus, Lead, StatusSnapshot,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How the current snapshot of a campaign was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Written locally ahead of a dispatch, pending confirmation
    Optimistic,
    /// Confirmed by the service
    Reconciled,
}

/// A campaign snapshot held by the registry
#[derive(Debug, Clone)]
pub struct CampaignEntry {
    pub campaign: Campaign,
    pub leads: Vec<Lead>,
    pub origin: SnapshotOrigin,
}

/// The single shared mutable store of campaign state.
///
/// All mutation goes through the merge operations below; each holds the
/// write lock for the whole merge, so readers never observe a partially
/// applied update.
#[derive(Default)]
pub struct CampaignRegistry {
    entries: RwLock<HashMap<CampaignId, CampaignEntry>>,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created campaign
    pub async fn insert(&self, campaign: Campaign) {
        let mut entries = self.entries.write().await;
        entries.insert(
            campaign.id,
            CampaignEntry {
                campaign,
                leads: Vec::new(),
                origin: SnapshotOrigin::Reconciled,
            },
        );
    }

    /// Merge a campaign listing. Leads already held for a campaign are
    /// kept; campaigns absent from the listing are dropped.
    pub async fn replace_all(&self, campaigns: Vec<Campaign>) {
        let mut entries = self.entries.write().await;
        let mut next: HashMap<CampaignId, CampaignEntry> = HashMap::with_capacity(campaigns.len());
        for campaign in campaigns {
            let leads = entries
                .remove(&campaign.id)
                .map(|e| e.leads)
                .unwrap_or_default();
            next.insert(
                campaign.id,
                CampaignEntry {
                    campaign,
                    leads,
                    origin: SnapshotOrigin::Reconciled,
                },
            );
        }
        *entries = next;
    }

    /// Write a locally assumed status ahead of a dispatch
    pub async fn apply_optimistic(&self, id: CampaignId, status: CampaignStatus, leads_count: u32) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            entry.campaign.status = status;
            entry.campaign.leads_count = leads_count;
            entry.origin = SnapshotOrigin::Optimistic;
            debug!(campaign_id = %id, status = %status, "optimistic snapshot applied");
        }
    }

    /// Merge a poll snapshot. Only status and lead count move; every other
    /// field keeps its current value. A snapshot whose status would move
    /// the campaign backwards is dropped whole.
    pub async fn apply_poll(&self, id: CampaignId, snapshot: &StatusSnapshot) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            let current = entry.campaign.status;
            if current != snapshot.status && !current.can_transition_to(snapshot.status) {
                warn!(
                    campaign_id = %id,
                    from = %current,
                    to = %snapshot.status,
                    "ignoring non-monotonic status from poll"
                );
                return;
            }
            entry.campaign.status = snapshot.status;
            entry.campaign.leads_count = snapshot.leads_count;
            entry.origin = SnapshotOrigin::Reconciled;
        }
    }

    /// Replace a campaign's document while keeping its loaded leads
    pub async fn apply_campaign(&self, campaign: Campaign) {
        let mut entries = self.entries.write().await;
        let leads = entries
            .remove(&campaign.id)
            .map(|e| e.leads)
            .unwrap_or_default();
        entries.insert(
            campaign.id,
            CampaignEntry {
                campaign,
                leads,
                origin: SnapshotOrigin::Reconciled,
            },
        );
    }

    /// Replace a campaign wholesale from a full fetch
    pub async fn apply_reconciled(&self, detail: CampaignDetail) {
        let mut entries = self.entries.write().await;
        entries.insert(
            detail.campaign.id,
            CampaignEntry {
                campaign: detail.campaign,
                leads: detail.leads,
                origin: SnapshotOrigin::Reconciled,
            },
        );
    }

    /// Record a dispatch rejection
    pub async fn mark_failed(&self, id: CampaignId) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&id) {
            entry.campaign.status = CampaignStatus::Failed;
            entry.origin = SnapshotOrigin::Reconciled;
        }
    }

    /// Forget a campaign
    pub async fn remove(&self, id: CampaignId) {
        self.entries.write().await.remove(&id);
    }

    /// Current snapshot of a campaign, if loaded
    pub async fn get(&self, id: CampaignId) -> Option<CampaignEntry> {
        self.entries.read().await.get(&id).cloned()
    }

    /// All currently loaded campaigns
    pub async fn campaigns(&self) -> Vec<Campaign> {
        self.entries
            .read()
            .await
            .values()
            .map(|e| e.campaign.clone())
            .collect()
    }
}
