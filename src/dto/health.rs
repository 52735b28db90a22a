use serde::Serialize;
use utoipa::ToSchema;

/// Whether the document store answered the last ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The store answered.
    Ok,
    /// The store is unreachable.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Store reachability.
    pub status: HealthStatus,
    /// Crate version of the running backend.
    pub version: &'static str,
}

impl HealthResponse {
    /// Response for the given store reachability.
    pub fn new(store_reachable: bool) -> Self {
        Self {
            status: if store_reachable {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
