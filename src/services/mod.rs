/// CSV export and merge-import of the library.
pub mod backup_service;
/// Header-keyed CSV rows over the `csv` crate.
pub mod csv_codec;
/// Epoch and calendar date helpers.
pub mod dates;
/// OpenAPI documentation generation.
pub mod documentation;
/// Lookup table used by batch inference.
pub mod entity_map;
/// Games, status history and playtime queries.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Default platforms and tags for new libraries.
pub mod onboarding_service;
/// Platform CRUD.
pub mod platform_service;
/// Play session CRUD and enrichment.
pub mod play_session_service;
/// Playtime aggregation rules.
pub mod playtime;
/// Reviews and their average rating.
pub mod review_service;
/// Play session filter predicates.
pub mod session_filters;
/// Storage connection retries and health polling.
pub mod storage_supervisor;
/// Tag CRUD and id lookups.
pub mod tag_service;
