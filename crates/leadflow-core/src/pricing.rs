//! Credit cost estimation for campaigns and email generation
//!
//! All figures are upper bounds shown before dispatch; the service settles
//! actual usage in `credits_used`.

use leadflow_common::types::Package;

/// Credits charged per crawled lead
pub const CREDITS_PER_LEAD: f64 = 1.0;

/// Additional credits per lead for the enrichment package
pub const ENRICHMENT_SURCHARGE: f64 = 0.5;

/// Additional credits per lead for the AI autopilot package
pub const AI_AUTOPILOT_SURCHARGE: f64 = 1.0;

/// Credits charged per generated email
pub const EMAIL_GENERATION_COST: f64 = 0.5;

/// Lead count assumed when the requested count is missing or invalid
pub const DEFAULT_TARGET_LEAD_COUNT: u32 = 10;

/// Resolve a raw requested lead count to a usable target.
///
/// Missing or non-positive input falls back to the default.
pub fn normalize_lead_count(raw: Option<i64>) -> u32 {
    match raw {
        Some(n) if n > 0 => n as u32,
        _ => DEFAULT_TARGET_LEAD_COUNT,
    }
}

/// Maximum credits a crawl with the given package can cost
pub fn estimate_max_cost(lead_count: u32, package: Package) -> f64 {
    let surcharge = match package {
        Package::LeadsOnly => 0.0,
        Package::Enrichment => ENRICHMENT_SURCHARGE,
        Package::AiAutopilot => AI_AUTOPILOT_SURCHARGE,
    };
    round1(lead_count as f64 * (CREDITS_PER_LEAD + surcharge))
}

/// Credits a generation batch over `eligible` leads will cost
pub fn generation_cost(eligible: usize) -> f64 {
    round1(eligible as f64 * EMAIL_GENERATION_COST)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
