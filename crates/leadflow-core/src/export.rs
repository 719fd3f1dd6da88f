//! CSV export of campaign leads

use chrono::NaiveDate;
use leadflow_common::types::Lead;

const HEADERS: [&str; 11] = [
    "Name",
    "Address",
    "Phone",
    "Email",
    "Website",
    "City",
    "Industry",
    "Rating",
    "Reviews",
    "Lead Score",
    "Status",
];

/// Render leads as a CSV document with a header row.
///
/// Every field is quoted; embedded quotes are doubled.
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut out = String::new();
    out.push_str(&row(HEADERS.iter().map(|h| h.to_string())));

    for lead in leads {
        let fields = [
            lead.company_name.clone(),
            lead.address.clone().unwrap_or_default(),
            lead.phone.clone().unwrap_or_default(),
            lead.email.clone().unwrap_or_default(),
            lead.website.clone().unwrap_or_default(),
            lead.city.clone().unwrap_or_default(),
            lead.industry.clone().unwrap_or_default(),
            lead.rating.map(|r| r.to_string()).unwrap_or_default(),
            lead.reviews_count.map(|r| r.to_string()).unwrap_or_default(),
            lead.lead_score.map(|s| s.to_string()).unwrap_or_default(),
            lead.status.to_string(),
        ];
        out.push_str(&row(fields.into_iter()));
    }

    out
}

/// File name for an export, derived from the campaign name and date
pub fn export_filename(campaign_name: &str, date: NaiveDate) -> String {
    let name: String = campaign_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}_leads_{}.csv", name, date.format("%Y-%m-%d"))
}

fn row(fields: impl Iterator<Item = String>) -> String {
    let quoted: Vec<String> = fields
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect();
    format!("{}\n", quoted.join(","))
}
