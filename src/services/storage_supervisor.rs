use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{dao::storage::StorageError, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Retry `connect` with exponential backoff until it succeeds or `max_attempts` is reached.
pub async fn connect_with_backoff<T, E, F, Fut>(mut connect: F, max_attempts: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt = 1;

    loop {
        match connect().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                warn!(attempt, error = %err, "storage connection attempt failed");
                attempt += 1;
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll the store health and keep the shared state's degraded flag current.
pub async fn watch_health(state: SharedState) {
    loop {
        match state.store().health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => report_failure(&state, &err),
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

fn report_failure(state: &SharedState, err: &StorageError) {
    if !state.is_degraded() {
        warn!(error = %err, "storage health check failed; entering degraded mode");
        state.update_degraded(true);
    }
}
