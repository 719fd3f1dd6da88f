//! Lead updates with repository-confirmed reloads

use crate::registry::CampaignRegistry;
use leadflow_client::ApiClient;
use leadflow_common::types::{CampaignId, EmailAddress, LeadId, LeadStatus};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Errors surfaced by lead updates
#[derive(Error, Debug)]
pub enum LeadUpdateError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    Api(#[from] leadflow_common::Error),
}

/// Applies lead mutations remotely and reconciles the owning campaign.
///
/// Every write goes to the service first and is followed by a full reload
/// of the campaign; there is no optimistic lead patching. A rejected write
/// leaves local state untouched.
pub struct LeadCoordinator {
    client: Arc<ApiClient>,
    registry: Arc<CampaignRegistry>,
    expanded: RwLock<Option<LeadId>>,
}

impl LeadCoordinator {
    pub fn new(client: Arc<ApiClient>, registry: Arc<CampaignRegistry>) -> Self {
        Self {
            client,
            registry,
            expanded: RwLock::new(None),
        }
    }

    /// Update the contact status of a lead
    pub async fn set_status(
        &self,
        campaign_id: CampaignId,
        lead_id: LeadId,
        status: LeadStatus,
    ) -> Result<(), LeadUpdateError> {
        self.client.set_lead_status(lead_id, status).await?;
        info!(lead_id = %lead_id, status = %status, "lead status updated");
        self.reload(campaign_id).await
    }

    /// Set or replace the email address of a lead.
    ///
    /// The address is validated locally before anything goes out.
    pub async fn set_email(
        &self,
        campaign_id: CampaignId,
        lead_id: LeadId,
        email: &str,
    ) -> Result<(), LeadUpdateError> {
        let address: EmailAddress = email
            .parse()
            .map_err(|_| LeadUpdateError::InvalidEmail(email.to_string()))?;
        self.client.set_lead_email(lead_id, address.as_str()).await?;
        info!(lead_id = %lead_id, "lead email updated");
        self.reload(campaign_id).await
    }

    /// Delete a lead, clearing the expanded selection if it pointed at it
    pub async fn delete_lead(
        &self,
        campaign_id: CampaignId,
        lead_id: LeadId,
    ) -> Result<(), LeadUpdateError> {
        self.client.delete_lead(lead_id).await?;
        {
            let mut expanded = self.expanded.write().await;
            if *expanded == Some(lead_id) {
                *expanded = None;
            }
        }
        info!(lead_id = %lead_id, "lead deleted");
        self.reload(campaign_id).await
    }

    /// Select which lead is expanded in detail views
    pub async fn expand(&self, lead_id: Option<LeadId>) {
        *self.expanded.write().await = lead_id;
    }

    /// Currently expanded lead, if any
    pub async fn expanded(&self) -> Option<LeadId> {
        *self.expanded.read().await
    }

    async fn reload(&self, campaign_id: CampaignId) -> Result<(), LeadUpdateError> {
        let detail = self.client.get_campaign(campaign_id).await?;
        self.registry.apply_reconciled(detail).await;
        Ok(())
    }
}
