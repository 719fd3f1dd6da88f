//! Leadflow Client - HTTP boundary to the lead-generation service

pub mod client;
pub mod payloads;

pub use client::ApiClient;
pub use payloads::{
    CampaignUpdate, CrawlAck, CrawlRequest, DraftUpdate, EnrichmentAck, EnrichmentRequest,
    GenerationReport, NewCampaign,
};
