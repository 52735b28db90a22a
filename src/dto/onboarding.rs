use serde::Serialize;
use utoipa::ToSchema;

use crate::services::onboarding_service::{SeedReport, SetupProgress};

/// Result of `POST /onboarding/defaults` with every milestone reached.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    /// Entities created.
    #[serde(flatten)]
    pub report: SeedReport,
    /// Milestones in the order they were reached.
    pub progress: Vec<SetupProgress>,
}
