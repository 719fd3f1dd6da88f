//! Core domain types for Leadflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Campaign identifier
pub type CampaignId = Uuid;

/// Lead identifier
pub type LeadId = Uuid;

/// Email draft identifier
pub type DraftId = Uuid;

/// User identifier
pub type UserId = Uuid;

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Crawling,
    Ready,
    Running,
    Paused,
    Completed,
    Failed,
}

impl CampaignStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            CampaignStatus::Draft => 0,
            CampaignStatus::Crawling => 1,
            CampaignStatus::Ready => 2,
            CampaignStatus::Running => 3,
            CampaignStatus::Paused => 4,
            CampaignStatus::Completed => 5,
            CampaignStatus::Failed => 6,
        }
    }

    /// Whether moving to `next` is a legal lifecycle transition.
    ///
    /// Transitions only move forward; `Failed` is reachable from any
    /// non-terminal status.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == CampaignStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Crawling => "crawling",
            CampaignStatus::Ready => "ready",
            CampaignStatus::Running => "running",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "crawling" => Ok(CampaignStatus::Crawling),
            "ready" => Ok(CampaignStatus::Ready),
            "running" => Ok(CampaignStatus::Running),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            "failed" => Ok(CampaignStatus::Failed),
            _ => Err(format!("Invalid campaign status: {}", s)),
        }
    }
}

/// Lead contact status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
    Invalid,
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Converted => "converted",
            LeadStatus::Invalid => "invalid",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "converted" => Ok(LeadStatus::Converted),
            "invalid" => Ok(LeadStatus::Invalid),
            _ => Err(format!("Invalid lead status: {}", s)),
        }
    }
}

/// Where a lead's email address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    Outscraper,
    ImpressumCrawler,
    ManualUser,
}

/// Campaign kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    LeadGeneration,
    AiEmailCampaign,
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignType::LeadGeneration => "lead_generation",
            CampaignType::AiEmailCampaign => "ai_email_campaign",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead_generation" => Ok(CampaignType::LeadGeneration),
            "ai_email_campaign" => Ok(CampaignType::AiEmailCampaign),
            _ => Err(format!("Invalid campaign type: {}", s)),
        }
    }
}

/// Billing package for a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Package {
    LeadsOnly,
    Enrichment,
    AiAutopilot,
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Package::LeadsOnly => "leads_only",
            Package::Enrichment => "enrichment",
            Package::AiAutopilot => "ai_autopilot",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Package {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leads_only" => Ok(Package::LeadsOnly),
            "enrichment" => Ok(Package::Enrichment),
            "ai_autopilot" => Ok(Package::AiAutopilot),
            _ => Err(format!("Invalid package: {}", s)),
        }
    }
}

/// Generation status of an email draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Draft,
    Edited,
}

/// A validated email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(EmailAddress(s.to_string()))
            }
            _ => Err(format!("Invalid email address: {}", s)),
        }
    }
}

/// Email generation settings attached to a campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub salutation: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub email_goal: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub max_words: u32,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

/// A lead-generation campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    #[serde(default)]
    pub leads_count: u32,
    #[serde(default)]
    pub credits_used: Option<f64>,
    #[serde(default)]
    pub package: Option<Package>,
    #[serde(default)]
    pub email_config: Option<EmailConfig>,
    #[serde(default)]
    pub email_config_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A business contact produced by a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub campaign_id: CampaignId,
    pub company_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_source: Option<EmailSource>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<u32>,
    #[serde(default)]
    pub lead_score: Option<u32>,
    #[serde(default)]
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Whether this lead can be addressed by email generation
    pub fn has_email(&self) -> bool {
        self.email.as_deref().map(|e| !e.is_empty()).unwrap_or(false)
    }
}

/// A generated outreach email awaiting review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    pub id: DraftId,
    pub lead_id: LeadId,
    #[serde(default)]
    pub lead_company: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub status: DraftStatus,
    #[serde(default)]
    pub edited_by_user: bool,
    pub created_at: DateTime<Utc>,
}

/// A campaign together with its leads, as returned by a full fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

/// Lightweight progress snapshot returned by the status endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: CampaignStatus,
    #[serde(default)]
    pub leads_count: u32,
}
