/// CSV import tally.
pub mod backup;
/// Game statistics and status requests.
pub mod game;
/// Health check body.
pub mod health;
/// Default-data seed response.
pub mod onboarding;
/// Enriched play sessions and their filters.
pub mod session;
/// Field validators and `Validate` impls for the entities.
pub mod validation;
