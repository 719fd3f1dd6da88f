//! Email generation planning, dispatch and draft editing

use crate::pricing;
use crate::registry::CampaignRegistry;
use leadflow_client::payloads::{CampaignUpdate, DraftUpdate, GenerationReport};
use leadflow_client::ApiClient;
use leadflow_common::types::{Campaign, CampaignId, DraftId, EmailConfig, EmailDraft};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Errors surfaced by email generation
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Campaign {0} has no completed email configuration")]
    NotConfigured(CampaignId),

    #[error("Campaign {0} has no leads with an email address")]
    NoEligibleLeads(CampaignId),

    #[error("Draft {0} is not loaded")]
    DraftNotLoaded(DraftId),

    #[error(transparent)]
    Api(#[from] leadflow_common::Error),
}

/// What a generation batch would cover and cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationPlan {
    /// Leads with an email address
    pub eligible: usize,
    /// Leads skipped for lacking one
    pub skipped: usize,
    /// Credits the batch will cost
    pub estimated_cost: f64,
}

/// Result of a dispatched generation batch
#[derive(Debug)]
pub struct GenerationOutcome {
    pub plan: GenerationPlan,
    pub report: GenerationReport,
}

/// An in-progress edit of a draft, keeping the last confirmed content so
/// the edit can be reverted without another fetch.
#[derive(Debug, Clone)]
pub struct DraftEdit {
    pub draft_id: DraftId,
    pub subject: String,
    pub body: String,
    original_subject: String,
    original_body: String,
}

impl DraftEdit {
    fn new(draft: &EmailDraft) -> Self {
        Self {
            draft_id: draft.id,
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            original_subject: draft.subject.clone(),
            original_body: draft.body.clone(),
        }
    }

    /// Restore the repository-confirmed content
    pub fn reset(&mut self) {
        self.subject = self.original_subject.clone();
        self.body = self.original_body.clone();
    }

    /// Whether the working copy differs from the confirmed content
    pub fn is_dirty(&self) -> bool {
        self.subject != self.original_subject || self.body != self.original_body
    }
}

/// Coordinates generation batches and the local draft snapshot
pub struct EmailGenCoordinator {
    client: Arc<ApiClient>,
    registry: Arc<CampaignRegistry>,
    drafts: RwLock<HashMap<DraftId, EmailDraft>>,
}

impl EmailGenCoordinator {
    pub fn new(client: Arc<ApiClient>, registry: Arc<CampaignRegistry>) -> Self {
        Self {
            client,
            registry,
            drafts: RwLock::new(HashMap::new()),
        }
    }

    /// Evaluate what a generation batch over this campaign would do.
    ///
    /// Fails before any remote call when the campaign is unconfigured or
    /// has nothing to address.
    pub async fn plan(&self, id: CampaignId) -> Result<GenerationPlan, GenerateError> {
        let entry = match self.registry.get(id).await {
            Some(entry) => entry,
            None => {
                let detail = self.client.get_campaign(id).await?;
                self.registry.apply_reconciled(detail).await;
                self.registry
                    .get(id)
                    .await
                    .ok_or_else(|| GenerateError::Api(leadflow_common::Error::NotFound(id.to_string())))?
            }
        };

        if !entry.campaign.email_config_completed {
            return Err(GenerateError::NotConfigured(id));
        }

        let eligible = entry.leads.iter().filter(|l| l.has_email()).count();
        let skipped = entry.leads.len() - eligible;
        if eligible == 0 {
            return Err(GenerateError::NoEligibleLeads(id));
        }

        Ok(GenerationPlan {
            eligible,
            skipped,
            estimated_cost: pricing::generation_cost(eligible),
        })
    }

    /// Persist the email configuration for an existing campaign.
    ///
    /// The service's stored version replaces the campaign document in the
    /// registry; loaded leads stay in place.
    pub async fn save_config(
        &self,
        id: CampaignId,
        config: EmailConfig,
    ) -> Result<Campaign, GenerateError> {
        let update = CampaignUpdate {
            email_config: Some(config),
            email_config_completed: Some(true),
            ..Default::default()
        };
        let campaign = self.client.update_campaign(id, &update).await?;
        info!(campaign_id = %id, "email configuration saved");
        self.registry.apply_campaign(campaign.clone()).await;
        Ok(campaign)
    }

    /// Dispatch a generation batch and reload the draft snapshot
    pub async fn run(&self, id: CampaignId) -> Result<GenerationOutcome, GenerateError> {
        let plan = self.plan(id).await?;
        let report = self.client.generate_emails(id).await?;
        info!(
            campaign_id = %id,
            generated = report.generated_count,
            failed = report.failed_count,
            "email generation finished"
        );
        self.reload_drafts(id).await?;
        Ok(GenerationOutcome { plan, report })
    }

    /// Replace the local draft snapshot from the service
    pub async fn reload_drafts(&self, id: CampaignId) -> Result<usize, GenerateError> {
        let drafts = self.client.list_drafts(id).await?;
        let count = drafts.len();
        let mut map = self.drafts.write().await;
        *map = drafts.into_iter().map(|d| (d.id, d)).collect();
        Ok(count)
    }

    /// Current snapshot of a draft, if loaded
    pub async fn draft(&self, draft_id: DraftId) -> Option<EmailDraft> {
        self.drafts.read().await.get(&draft_id).cloned()
    }

    /// All loaded drafts
    pub async fn drafts(&self) -> Vec<EmailDraft> {
        self.drafts.read().await.values().cloned().collect()
    }

    /// Begin editing a loaded draft
    pub async fn begin_edit(&self, draft_id: DraftId) -> Result<DraftEdit, GenerateError> {
        self.drafts
            .read()
            .await
            .get(&draft_id)
            .map(DraftEdit::new)
            .ok_or(GenerateError::DraftNotLoaded(draft_id))
    }

    /// Persist an edit, replacing the snapshot with the stored version
    pub async fn save(
        &self,
        campaign_id: CampaignId,
        edit: &DraftEdit,
    ) -> Result<EmailDraft, GenerateError> {
        let update = DraftUpdate {
            subject: edit.subject.clone(),
            body: edit.body.clone(),
        };
        let stored = self
            .client
            .save_draft(campaign_id, edit.draft_id, &update)
            .await?;
        info!(draft_id = %edit.draft_id, "draft saved");
        self.drafts.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }
}
