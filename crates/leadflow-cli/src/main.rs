//! Leadflow - Campaign lifecycle command line entry point

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leadflow_client::payloads::{CrawlRequest, NewCampaign};
use leadflow_client::ApiClient;
use leadflow_common::config::Config;
use leadflow_common::types::{CampaignId, CampaignType, EmailConfig, Package, UserId};
use leadflow_core::{
    export, pricing, CampaignRegistry, EmailGenCoordinator, JobDispatcher, PollOutcome,
    StatusPoller,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "leadflow", about = "Lead-generation campaign orchestration")]
struct Cli {
    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User identity, overriding the configured one
    #[arg(long, global = true)]
    user: Option<UserId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List campaigns
    List,
    /// Create a campaign
    Create {
        /// Campaign name; derived from keywords and location when omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Billing package: leads_only, enrichment or ai_autopilot
        #[arg(long, default_value = "leads_only")]
        package: String,
        /// Search keywords used for name derivation
        #[arg(long)]
        keyword: Vec<String>,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Start a crawl and watch it to completion
    Crawl {
        id: CampaignId,
        #[arg(long, required = true)]
        keyword: Vec<String>,
        #[arg(long)]
        location: String,
        /// Target lead count; falls back to the default when omitted
        #[arg(long)]
        leads: Option<i64>,
        /// Search radius in kilometers
        #[arg(long)]
        radius: Option<u32>,
        /// Minimum business rating
        #[arg(long)]
        min_rating: Option<f64>,
        /// Minimum review count
        #[arg(long)]
        min_reviews: Option<u32>,
        /// Billing package used for the cost ceiling shown before dispatch
        #[arg(long, default_value = "leads_only")]
        package: String,
    },
    /// Show the current status of a campaign
    Status { id: CampaignId },
    /// Show the cost ceiling for a crawl
    Estimate {
        #[arg(long)]
        leads: Option<i64>,
        #[arg(long, default_value = "leads_only")]
        package: String,
    },
    /// Save the email configuration of a campaign
    Configure {
        id: CampaignId,
        #[arg(long, default_value = "professional")]
        tone: String,
        #[arg(long, default_value = "formal")]
        salutation: String,
        #[arg(long, default_value = "de")]
        language: String,
        #[arg(long, default_value = "introduction")]
        goal: String,
        #[arg(long, default_value = "reply")]
        call_to_action: String,
        #[arg(long, default_value_t = 150)]
        max_words: u32,
        #[arg(long)]
        custom_prompt: Option<String>,
    },
    /// Generate outreach emails for a campaign
    Generate { id: CampaignId },
    /// Export the leads of a campaign as CSV
    Export {
        id: CampaignId,
        /// Output path; defaults to a name derived from the campaign
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a campaign
    Delete { id: CampaignId },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    init_logging(&config);

    let user_id = cli.user.or(config.api.user_id);
    let client = Arc::new(ApiClient::new(config.api.clone())?);
    let registry = Arc::new(CampaignRegistry::new());
    let dispatcher = JobDispatcher::new(client.clone(), registry.clone());
    let poller = Arc::new(
        StatusPoller::new(client.clone(), registry.clone())
            .with_interval(Duration::from_secs(config.poller.interval_secs))
            .with_ceiling(Duration::from_secs(config.poller.ceiling_secs)),
    );

    match cli.command {
        Command::List => {
            let user_id = require_user(user_id)?;
            let campaigns = client.list_campaigns(user_id).await?;
            registry.replace_all(campaigns.clone()).await;
            for c in campaigns {
                println!("{}  {:<12} {:>5} leads  {}", c.id, c.status, c.leads_count, c.name);
            }
        }

        Command::Create {
            name,
            description,
            package,
            keyword,
            location,
        } => {
            let user_id = require_user(user_id)?;
            let package: Package = parse_package(&package)?;
            let name = name.unwrap_or_else(|| NewCampaign::auto_name(&keyword, &location));
            let campaign = dispatcher
                .create_campaign(&NewCampaign {
                    user_id,
                    name,
                    description,
                    campaign_type: CampaignType::LeadGeneration,
                    package: Some(package),
                    email_config: None,
                })
                .await?;
            println!("{}  {}", campaign.id, campaign.name);
        }

        Command::Crawl {
            id,
            keyword,
            location,
            leads,
            radius,
            min_rating,
            min_reviews,
            package,
        } => {
            let user_id = require_user(user_id)?;
            let package: Package = parse_package(&package)?;
            let target = pricing::normalize_lead_count(leads);
            println!(
                "Up to {} credits for {} leads ({})",
                pricing::estimate_max_cost(target, package),
                target,
                package
            );

            dispatcher
                .start_crawl(
                    id,
                    CrawlRequest {
                        campaign_id: id,
                        user_id,
                        keywords: keyword,
                        location,
                        radius,
                        target_lead_count: target,
                        min_rating,
                        min_reviews,
                    },
                )
                .await?;

            poller.watch(id).await;
            match poller.wait(id).await {
                Some(PollOutcome::Resolved(status)) => {
                    let entry = registry
                        .get(id)
                        .await
                        .context("campaign vanished from the registry")?;
                    println!("{}: {} ({} leads)", id, status, entry.campaign.leads_count);
                }
                Some(PollOutcome::TimedOut) => {
                    println!("{}: still running, check back later", id);
                }
                None => bail!("polling task was cancelled"),
            }
        }

        Command::Status { id } => {
            let detail = client.get_campaign(id).await?;
            let c = &detail.campaign;
            println!("{}  {:<12} {:>5} leads  {}", c.id, c.status, c.leads_count, c.name);
            if let Some(credits) = c.credits_used {
                println!("credits used: {}", credits);
            }
        }

        Command::Estimate { leads, package } => {
            let package: Package = parse_package(&package)?;
            let target = pricing::normalize_lead_count(leads);
            println!(
                "{} leads, {}: up to {} credits",
                target,
                package,
                pricing::estimate_max_cost(target, package)
            );
        }

        Command::Configure {
            id,
            tone,
            salutation,
            language,
            goal,
            call_to_action,
            max_words,
            custom_prompt,
        } => {
            let emailgen = EmailGenCoordinator::new(client.clone(), registry.clone());
            let campaign = emailgen
                .save_config(
                    id,
                    EmailConfig {
                        tone,
                        salutation,
                        language,
                        email_goal: goal,
                        call_to_action,
                        max_words,
                        custom_prompt,
                    },
                )
                .await?;
            println!("{} configured for email generation", campaign.id);
        }

        Command::Generate { id } => {
            let emailgen = EmailGenCoordinator::new(client.clone(), registry.clone());
            let plan = emailgen.plan(id).await?;
            println!(
                "{} eligible, {} skipped, {} credits",
                plan.eligible, plan.skipped, plan.estimated_cost
            );
            let outcome = emailgen.run(id).await?;
            println!(
                "generated {}, failed {}",
                outcome.report.generated_count, outcome.report.failed_count
            );
            for error in &outcome.report.errors {
                println!("  {}", error);
            }
        }

        Command::Export { id, out } => {
            let detail = client.get_campaign(id).await?;
            let csv = export::leads_to_csv(&detail.leads);
            let path = out.unwrap_or_else(|| {
                PathBuf::from(export::export_filename(
                    &detail.campaign.name,
                    chrono::Utc::now().date_naive(),
                ))
            });
            std::fs::write(&path, csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} leads written to {}", detail.leads.len(), path.display());
        }

        Command::Delete { id } => {
            let user_id = require_user(user_id)?;
            poller.stop(id).await;
            dispatcher.delete_campaign(id, user_id).await?;
            println!("{} deleted", id);
        }
    }

    poller.shutdown().await;
    info!("done");
    Ok(())
}

fn require_user(user_id: Option<UserId>) -> Result<UserId> {
    user_id.context("No user id given; pass --user or set api.user_id in the config")
}

fn parse_package(raw: &str) -> Result<Package> {
    raw.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},leadflow=debug", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
