//! Request and response payloads for the lead-generation API

use leadflow_common::types::{CampaignId, CampaignType, EmailConfig, Package, UserId};
use serde::{Deserialize, Serialize};

/// Payload for creating a campaign
#[derive(Debug, Clone, Serialize)]
pub struct NewCampaign {
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub campaign_type: CampaignType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<Package>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_config: Option<EmailConfig>,
}

impl NewCampaign {
    /// Derive a display name from search terms when none was given
    pub fn auto_name(keywords: &[String], location: &str) -> String {
        let terms = keywords.join(", ");
        if location.is_empty() {
            terms
        } else {
            format!("{} in {}", terms, location)
        }
    }
}

/// Payload for updating an existing campaign
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_config: Option<EmailConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_config_completed: Option<bool>,
}

/// Payload for starting a crawl job
#[derive(Debug, Clone, Serialize)]
pub struct CrawlRequest {
    pub campaign_id: CampaignId,
    pub user_id: UserId,
    pub keywords: Vec<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    pub target_lead_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_reviews: Option<u32>,
}

/// Acknowledgement returned by the crawl endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlAck {
    pub success: bool,
    #[serde(default)]
    pub leads_found: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload for starting an enrichment job
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentRequest {
    pub campaign_id: CampaignId,
    pub websites: Vec<String>,
}

/// Acknowledgement returned by the enrichment endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentAck {
    pub success: bool,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of an email generation batch
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationReport {
    pub generated_count: u32,
    pub failed_count: u32,
    pub total_leads: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Payload for saving an edited email draft
#[derive(Debug, Clone, Serialize)]
pub struct DraftUpdate {
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_name() {
        let keywords = vec!["dentist".to_string(), "orthodontist".to_string()];
        assert_eq!(
            NewCampaign::auto_name(&keywords, "Munich"),
            "dentist, orthodontist in Munich"
        );
        assert_eq!(NewCampaign::auto_name(&keywords, ""), "dentist, orthodontist");
    }
}
