//! API client for the lead-generation service

use crate::payloads::{
    CampaignUpdate, CrawlAck, CrawlRequest, DraftUpdate, EnrichmentAck, EnrichmentRequest,
    GenerationReport, NewCampaign,
};
use leadflow_common::config::ApiConfig;
use leadflow_common::types::{
    Campaign, CampaignDetail, CampaignId, DraftId, EmailDraft, LeadId, LeadStatus, StatusSnapshot,
    UserId,
};
use leadflow_common::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the lead-generation API
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get authorization header if API key is configured
    fn auth_header(&self) -> Option<(&'static str, String)> {
        self.config
            .api_key
            .as_ref()
            .map(|key| ("Authorization", format!("Bearer {}", key)))
    }

    /// Build a request with optional auth header
    fn build_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.client.request(method, &url);

        if let Some((header, value)) = self.auth_header() {
            request = request.header(header, value);
        }

        request
    }

    /// Send a request and decode a JSON response body
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }

    /// Send a request, discarding the response body
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Create a new campaign
    pub async fn create_campaign(&self, payload: &NewCampaign) -> Result<Campaign> {
        let request = self
            .build_request(reqwest::Method::POST, "/api/campaigns/create")
            .json(payload);
        self.execute(request).await
    }

    /// List campaigns belonging to a user
    pub async fn list_campaigns(&self, user_id: UserId) -> Result<Vec<Campaign>> {
        let path = format!("/api/campaigns/list/{}", user_id);
        self.execute(self.build_request(reqwest::Method::GET, &path))
            .await
    }

    /// Fetch a campaign with all its leads
    pub async fn get_campaign(&self, id: CampaignId) -> Result<CampaignDetail> {
        let path = format!("/api/campaigns/{}", id);
        self.execute(self.build_request(reqwest::Method::GET, &path))
            .await
    }

    /// Fetch the lightweight progress snapshot for a campaign
    pub async fn fetch_status(&self, id: CampaignId) -> Result<StatusSnapshot> {
        let path = format!("/api/campaigns/{}/status", id);
        let snapshot: StatusSnapshot = self
            .execute(self.build_request(reqwest::Method::GET, &path))
            .await?;
        debug!(campaign_id = %id, status = %snapshot.status, leads = snapshot.leads_count, "status snapshot");
        Ok(snapshot)
    }

    /// Update an existing campaign, returning the stored version
    pub async fn update_campaign(
        &self,
        id: CampaignId,
        update: &CampaignUpdate,
    ) -> Result<Campaign> {
        let path = format!("/api/campaigns/{}", id);
        let request = self.build_request(reqwest::Method::PUT, &path).json(update);
        self.execute(request).await
    }

    /// Delete a campaign and everything attached to it
    pub async fn delete_campaign(&self, id: CampaignId, user_id: UserId) -> Result<()> {
        let path = format!("/api/campaigns/{}", id);
        let request = self
            .build_request(reqwest::Method::DELETE, &path)
            .header("X-User-Id", user_id.to_string());
        self.execute_empty(request).await
    }

    /// Start a crawl job
    pub async fn start_crawl(&self, payload: &CrawlRequest) -> Result<CrawlAck> {
        let request = self
            .build_request(reqwest::Method::POST, "/api/campaigns/crawl/start")
            .json(payload);
        self.execute(request).await
    }

    /// Start an enrichment job
    pub async fn start_enrichment(&self, payload: &EnrichmentRequest) -> Result<EnrichmentAck> {
        let request = self
            .build_request(reqwest::Method::POST, "/api/campaigns/enrichment/start")
            .json(payload);
        self.execute(request).await
    }

    /// Run email generation for every eligible lead of a campaign
    pub async fn generate_emails(&self, id: CampaignId) -> Result<GenerationReport> {
        let path = format!("/api/campaigns/{}/generate-emails", id);
        self.execute(self.build_request(reqwest::Method::POST, &path))
            .await
    }

    /// List the email drafts of a campaign
    pub async fn list_drafts(&self, id: CampaignId) -> Result<Vec<EmailDraft>> {
        let path = format!("/api/campaigns/{}/emails", id);
        self.execute(self.build_request(reqwest::Method::GET, &path))
            .await
    }

    /// Save an edited draft, returning the stored version
    pub async fn save_draft(
        &self,
        campaign_id: CampaignId,
        draft_id: DraftId,
        update: &DraftUpdate,
    ) -> Result<EmailDraft> {
        let path = format!("/api/campaigns/{}/emails/{}", campaign_id, draft_id);
        let request = self.build_request(reqwest::Method::PUT, &path).json(update);
        self.execute(request).await
    }

    /// Update the contact status of a lead
    pub async fn set_lead_status(&self, lead_id: LeadId, status: LeadStatus) -> Result<()> {
        let path = format!("/api/campaigns/leads/{}/status", lead_id);
        let request = self
            .build_request(reqwest::Method::PATCH, &path)
            .json(&serde_json::json!({ "status": status }));
        self.execute_empty(request).await
    }

    /// Set or replace the email address of a lead
    pub async fn set_lead_email(&self, lead_id: LeadId, email: &str) -> Result<()> {
        let path = format!("/api/campaigns/leads/{}/email", lead_id);
        let request = self
            .build_request(reqwest::Method::PATCH, &path)
            .json(&serde_json::json!({ "email": email }));
        self.execute_empty(request).await
    }

    /// Delete a single lead
    pub async fn delete_lead(&self, lead_id: LeadId) -> Result<()> {
        let path = format!("/api/campaigns/leads/{}", lead_id);
        self.execute_empty(self.build_request(reqwest::Method::DELETE, &path))
            .await
    }
}
