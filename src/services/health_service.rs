use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the document store and report whether the backend is usable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.store().health_check().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            false
        }
    };

    state.update_degraded(!reachable);
    HealthResponse::new(reachable)
}
