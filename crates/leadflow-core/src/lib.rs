//! Leadflow Core - Campaign lifecycle orchestration
//!
//! Cost estimation, the shared campaign registry, job dispatch, status
//! polling, lead updates and email generation coordination.

pub mod dispatch;
pub mod emailgen;
pub mod export;
pub mod leads;
pub mod poller;
pub mod pricing;
pub mod registry;

pub use dispatch::{DispatchError, JobDispatcher};
pub use emailgen::{DraftEdit, EmailGenCoordinator, GenerateError, GenerationPlan};
pub use leads::{LeadCoordinator, LeadUpdateError};
pub use poller::{PollOutcome, StatusPoller};
pub use registry::{CampaignEntry, CampaignRegistry, SnapshotOrigin};
