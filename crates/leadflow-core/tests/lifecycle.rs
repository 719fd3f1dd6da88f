//! End-to-end campaign lifecycle against a mocked service

use leadflow_client::payloads::{CrawlRequest, NewCampaign};
use leadflow_client::ApiClient;
use leadflow_common::config::ApiConfig;
use leadflow_common::types::{CampaignStatus, CampaignType, Package};
use leadflow_core::{
    pricing, CampaignRegistry, EmailGenCoordinator, JobDispatcher, PollOutcome, StatusPoller,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    let config = ApiConfig {
        base_url: server.uri(),
        api_key: None,
        timeout_secs: 5,
        user_id: None,
    };
    Arc::new(ApiClient::new(config).unwrap())
}

fn lead_json(campaign_id: Uuid, name: &str, email: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4(),
        "campaign_id": campaign_id,
        "company_name": name,
        "email": email,
        "status": "new",
        "created_at": "2025-06-01T12:05:00Z"
    })
}

#[tokio::test]
async fn crawl_to_generation_lifecycle() {
    let server = MockServer::start().await;
    let campaign_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    // The user asked for 10 leads on the enrichment package
    let target = pricing::normalize_lead_count(Some(10));
    assert_eq!(pricing::estimate_max_cost(target, Package::Enrichment), 15.0);

    Mock::given(method("POST"))
        .and(path("/api/campaigns/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": campaign_id,
            "user_id": user_id,
            "name": "Dentists in Munich",
            "campaign_type": "lead_generation",
            "status": "draft",
            "leads_count": 0,
            "package": "enrichment",
            "created_at": "2025-06-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/campaigns/crawl/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "leads_found": 0
        })))
        .mount(&server)
        .await;

    // Two in-flight ticks, then terminal
    Mock::given(method("GET"))
        .and(path(format!("/api/campaigns/{}/status", campaign_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "crawling",
            "leads_count": 3
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/campaigns/{}/status", campaign_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "leads_count": 8
        })))
        .mount(&server)
        .await;

    // Full reload: 8 leads, 3 with an email address
    let leads = serde_json::json!([
        lead_json(campaign_id, "Praxis Huber", Some("info@huber.de")),
        lead_json(campaign_id, "Zahnarzt Meier", Some("kontakt@meier.de")),
        lead_json(campaign_id, "Dr. Schmidt", Some("praxis@schmidt.de")),
        lead_json(campaign_id, "Praxis Vogel", None),
        lead_json(campaign_id, "Dentallabor Kern", None),
        lead_json(campaign_id, "Zahnklinik Ost", None),
        lead_json(campaign_id, "Praxis Wolf", None),
        lead_json(campaign_id, "Dr. Braun", None),
    ]);
    Mock::given(method("GET"))
        .and(path(format!("/api/campaigns/{}", campaign_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "campaign": {
                "id": campaign_id,
                "user_id": user_id,
                "name": "Dentists in Munich",
                "campaign_type": "lead_generation",
                "status": "completed",
                "leads_count": 8,
                "credits_used": 12.5,
                "package": "enrichment",
                "email_config_completed": true,
                "created_at": "2025-06-01T12:00:00Z"
            },
            "leads": leads
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let registry = Arc::new(CampaignRegistry::new());
    let dispatcher = JobDispatcher::new(client.clone(), registry.clone());

    let campaign = dispatcher
        .create_campaign(&NewCampaign {
            user_id,
            name: NewCampaign::auto_name(&["dentist".to_string()], "Munich"),
            description: None,
            campaign_type: CampaignType::LeadGeneration,
            package: Some(Package::Enrichment),
            email_config: None,
        })
        .await
        .unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);

    dispatcher
        .start_crawl(
            campaign_id,
            CrawlRequest {
                campaign_id,
                user_id,
                keywords: vec!["dentist".to_string()],
                location: "Munich".to_string(),
                radius: Some(25),
                target_lead_count: target,
                min_rating: None,
                min_reviews: None,
            },
        )
        .await
        .unwrap();

    // Optimistic snapshot before the service confirms anything
    let entry = registry.get(campaign_id).await.unwrap();
    assert_eq!(entry.campaign.status, CampaignStatus::Crawling);
    assert_eq!(entry.campaign.leads_count, 0);

    let poller = Arc::new(
        StatusPoller::new(client.clone(), registry.clone())
            .with_interval(Duration::from_millis(10))
            .with_ceiling(Duration::from_secs(2)),
    );
    poller.watch(campaign_id).await;
    let outcome = poller.wait(campaign_id).await.unwrap();
    assert_eq!(outcome, PollOutcome::Resolved(CampaignStatus::Completed));

    let entry = registry.get(campaign_id).await.unwrap();
    assert_eq!(entry.campaign.status, CampaignStatus::Completed);
    assert_eq!(entry.campaign.leads_count, 8);
    assert_eq!(entry.campaign.credits_used, Some(12.5));
    assert_eq!(entry.leads.len(), 8);

    // Generation planning over the reconciled leads
    let emailgen = EmailGenCoordinator::new(client, registry);
    let plan = emailgen.plan(campaign_id).await.unwrap();
    assert_eq!(plan.eligible, 3);
    assert_eq!(plan.skipped, 5);
    assert_eq!(plan.estimated_cost, 1.5);
}
