//! Job dispatch with optimistic status updates

use crate::registry::CampaignRegistry;
use leadflow_client::payloads::{CrawlAck, CrawlRequest, EnrichmentAck, EnrichmentRequest, NewCampaign};
use leadflow_client::ApiClient;
use leadflow_common::types::{Campaign, CampaignId, CampaignStatus, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Errors surfaced by job dispatch
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Job rejected: {message}")]
    Rejected { message: String },

    #[error("Campaign {0} already has a crawl in flight")]
    AlreadyCrawling(CampaignId),

    #[error("Campaign {0} already has an enrichment in flight")]
    AlreadyEnriching(CampaignId),

    #[error(transparent)]
    Api(#[from] leadflow_common::Error),
}

/// Starts background jobs on the service and keeps the registry consistent
/// with what was requested.
pub struct JobDispatcher {
    client: Arc<ApiClient>,
    registry: Arc<CampaignRegistry>,
    enriching: Mutex<HashSet<CampaignId>>,
}

impl JobDispatcher {
    pub fn new(client: Arc<ApiClient>, registry: Arc<CampaignRegistry>) -> Self {
        Self {
            client,
            registry,
            enriching: Mutex::new(HashSet::new()),
        }
    }

    /// Create a campaign and register it locally
    pub async fn create_campaign(&self, payload: &NewCampaign) -> Result<Campaign, DispatchError> {
        let campaign = self.client.create_campaign(payload).await?;
        info!(campaign_id = %campaign.id, name = %campaign.name, "campaign created");
        self.registry.insert(campaign.clone()).await;
        Ok(campaign)
    }

    /// Start a crawl job for a campaign.
    ///
    /// The registry is moved to `crawling` with a zeroed lead count before
    /// the request goes out; a rejected or failed dispatch marks the
    /// campaign `failed`.
    pub async fn start_crawl(
        &self,
        id: CampaignId,
        payload: CrawlRequest,
    ) -> Result<CrawlAck, DispatchError> {
        let entry = self.ensure_loaded(id).await?;
        if entry.campaign.status == CampaignStatus::Crawling {
            return Err(DispatchError::AlreadyCrawling(id));
        }

        self.registry
            .apply_optimistic(id, CampaignStatus::Crawling, 0)
            .await;

        match self.client.start_crawl(&payload).await {
            Ok(ack) if ack.success => {
                info!(campaign_id = %id, "crawl dispatched");
                Ok(ack)
            }
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| "crawl rejected by service".to_string());
                warn!(campaign_id = %id, %message, "crawl rejected");
                self.registry.mark_failed(id).await;
                Err(DispatchError::Rejected { message })
            }
            Err(e) => {
                warn!(campaign_id = %id, error = %e, "crawl dispatch failed");
                self.registry.mark_failed(id).await;
                Err(DispatchError::Rejected {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Start an enrichment job. Enrichment does not own the campaign
    /// status, so no optimistic status write happens here.
    pub async fn start_enrichment(
        &self,
        id: CampaignId,
        websites: Vec<String>,
    ) -> Result<EnrichmentAck, DispatchError> {
        {
            let mut enriching = self.enriching.lock().await;
            if !enriching.insert(id) {
                return Err(DispatchError::AlreadyEnriching(id));
            }
        }

        let result = self
            .client
            .start_enrichment(&EnrichmentRequest {
                campaign_id: id,
                websites,
            })
            .await;

        self.enriching.lock().await.remove(&id);

        match result {
            Ok(ack) if ack.success => {
                info!(campaign_id = %id, count = ack.count, "enrichment dispatched");
                Ok(ack)
            }
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| "enrichment rejected by service".to_string());
                warn!(campaign_id = %id, %message, "enrichment rejected");
                Err(DispatchError::Rejected { message })
            }
            Err(e) => {
                warn!(campaign_id = %id, error = %e, "enrichment dispatch failed");
                Err(DispatchError::Rejected {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Delete a campaign on the service and locally
    pub async fn delete_campaign(&self, id: CampaignId, user_id: UserId) -> Result<(), DispatchError> {
        self.client.delete_campaign(id, user_id).await?;
        self.registry.remove(id).await;
        info!(campaign_id = %id, "campaign deleted");
        Ok(())
    }

    /// Fetch the campaign into the registry if it is not loaded yet
    async fn ensure_loaded(
        &self,
        id: CampaignId,
    ) -> Result<crate::registry::CampaignEntry, DispatchError> {
        if let Some(entry) = self.registry.get(id).await {
            return Ok(entry);
        }
        let detail = self.client.get_campaign(id).await?;
        self.registry.apply_reconciled(detail).await;
        self.registry
            .get(id)
            .await
            .ok_or_else(|| DispatchError::Api(leadflow_common::Error::NotFound(id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leadflow_common::config::ApiConfig;
    use leadflow_common::types::CampaignType;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> Arc<ApiClient> {
        let config = ApiConfig {
            base_url: server.uri(),
            api_key: None,
            timeout_secs: 5,
            user_id: None,
        };
        Arc::new(ApiClient::new(config).unwrap())
    }

    fn sample_campaign(status: CampaignStatus) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dentists in Munich".to_string(),
            description: None,
            campaign_type: CampaignType::LeadGeneration,
            status,
            leads_count: 0,
            credits_used: None,
            package: None,
            email_config: None,
            email_config_completed: false,
            created_at: Utc::now(),
        }
    }

    fn crawl_request(id: CampaignId) -> CrawlRequest {
        CrawlRequest {
            campaign_id: id,
            user_id: Uuid::new_v4(),
            keywords: vec!["dentist".to_string()],
            location: "Munich".to_string(),
            radius: None,
            target_lead_count: 10,
            min_rating: None,
            min_reviews: None,
        }
    }

    #[tokio::test]
    async fn test_start_crawl_writes_optimistic_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/crawl/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "leads_found": 0
            })))
            .mount(&server)
            .await;

        let registry = Arc::new(CampaignRegistry::new());
        let campaign = sample_campaign(CampaignStatus::Draft);
        let id = campaign.id;
        registry.insert(campaign).await;

        let dispatcher = JobDispatcher::new(test_client(&server), registry.clone());
        dispatcher.start_crawl(id, crawl_request(id)).await.unwrap();

        let entry = registry.get(id).await.unwrap();
        assert_eq!(entry.campaign.status, CampaignStatus::Crawling);
        assert_eq!(entry.campaign.leads_count, 0);
    }

    #[tokio::test]
    async fn test_rejected_crawl_marks_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/crawl/start"))
            .respond_with(ResponseTemplate::new(500).set_body_string("out of credits"))
            .mount(&server)
            .await;

        let registry = Arc::new(CampaignRegistry::new());
        let campaign = sample_campaign(CampaignStatus::Draft);
        let id = campaign.id;
        registry.insert(campaign).await;

        let dispatcher = JobDispatcher::new(test_client(&server), registry.clone());
        let err = dispatcher
            .start_crawl(id, crawl_request(id))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Rejected { .. }));

        let entry = registry.get(id).await.unwrap();
        assert_eq!(entry.campaign.status, CampaignStatus::Failed);
    }

    #[tokio::test]
    async fn test_unsuccessful_ack_marks_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/crawl/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "quota exceeded"
            })))
            .mount(&server)
            .await;

        let registry = Arc::new(CampaignRegistry::new());
        let campaign = sample_campaign(CampaignStatus::Draft);
        let id = campaign.id;
        registry.insert(campaign).await;

        let dispatcher = JobDispatcher::new(test_client(&server), registry.clone());
        let err = dispatcher
            .start_crawl(id, crawl_request(id))
            .await
            .unwrap_err();
        match err {
            DispatchError::Rejected { message } => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            registry.get(id).await.unwrap().campaign.status,
            CampaignStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_start_enrichment_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/enrichment/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "count": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher =
            JobDispatcher::new(test_client(&server), Arc::new(CampaignRegistry::new()));
        let ack = dispatcher
            .start_enrichment(Uuid::new_v4(), vec!["https://acme.de".to_string()])
            .await
            .unwrap();
        assert_eq!(ack.count, 2);
    }

    #[tokio::test]
    async fn test_rejected_enrichment_keeps_campaign_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/enrichment/start"))
            .respond_with(ResponseTemplate::new(500).set_body_string("crawler unavailable"))
            .mount(&server)
            .await;

        let registry = Arc::new(CampaignRegistry::new());
        let campaign = sample_campaign(CampaignStatus::Ready);
        let id = campaign.id;
        registry.insert(campaign).await;

        let dispatcher = JobDispatcher::new(test_client(&server), registry.clone());
        let err = dispatcher
            .start_enrichment(id, vec!["https://acme.de".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Rejected { .. }));

        // Enrichment does not own the campaign status
        assert_eq!(
            registry.get(id).await.unwrap().campaign.status,
            CampaignStatus::Ready
        );
    }

    #[tokio::test]
    async fn test_unsuccessful_enrichment_ack_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/enrichment/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "no crawlable websites"
            })))
            .mount(&server)
            .await;

        let dispatcher =
            JobDispatcher::new(test_client(&server), Arc::new(CampaignRegistry::new()));
        let err = dispatcher
            .start_enrichment(Uuid::new_v4(), vec![])
            .await
            .unwrap_err();
        match err {
            DispatchError::Rejected { message } => assert_eq!(message, "no crawlable websites"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrichment_guard_rejects_concurrent_dispatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/campaigns/enrichment/start"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "success": true, "count": 1 }))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let dispatcher = Arc::new(JobDispatcher::new(
            test_client(&server),
            Arc::new(CampaignRegistry::new()),
        ));
        let id = Uuid::new_v4();

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .start_enrichment(id, vec!["https://acme.de".to_string()])
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let err = dispatcher
            .start_enrichment(id, vec!["https://acme.de".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyEnriching(c) if c == id));

        first.await.unwrap().unwrap();

        // Guard releases once the dispatch settles
        dispatcher
            .start_enrichment(id, vec!["https://acme.de".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_crawl_guard_rejects_double_dispatch() {
        let server = MockServer::start().await;
        let registry = Arc::new(CampaignRegistry::new());
        let campaign = sample_campaign(CampaignStatus::Crawling);
        let id = campaign.id;
        registry.insert(campaign).await;

        let dispatcher = JobDispatcher::new(test_client(&server), registry);
        let err = dispatcher
            .start_crawl(id, crawl_request(id))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyCrawling(c) if c == id));
        // No request reached the server
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
