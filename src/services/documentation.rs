use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Playloop backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::save_game,
        crate::routes::games::get_game,
        crate::routes::games::delete_game,
        crate::routes::games::game_stats,
        crate::routes::games::status_history,
        crate::routes::games::set_status,
        crate::routes::games::get_review,
        crate::routes::games::put_review,
        crate::routes::platforms::list_platforms,
        crate::routes::platforms::save_platform,
        crate::routes::platforms::delete_platform,
        crate::routes::tags::list_tags,
        crate::routes::tags::save_tag,
        crate::routes::tags::delete_tag,
        crate::routes::sessions::list_sessions,
        crate::routes::sessions::save_session,
        crate::routes::sessions::delete_session,
        crate::routes::backup::export_backup,
        crate::routes::backup::import_backup,
        crate::routes::onboarding::seed_defaults,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::GameStats,
            crate::dto::game::PlatformPlaytime,
            crate::dto::game::SetStatusRequest,
            crate::dto::session::InferredPlaySession,
            crate::dto::session::InferredGamingSession,
            crate::dto::backup::ImportReport,
            crate::dto::onboarding::SeedResponse,
            crate::services::onboarding_service::SeedReport,
            crate::services::onboarding_service::SetupProgress,
            crate::dao::models::Game,
            crate::dao::models::Platform,
            crate::dao::models::Tag,
            crate::dao::models::PlaySession,
            crate::dao::models::GamingSession,
            crate::dao::models::GameStatusHistory,
            crate::dao::models::Review,
            crate::dao::models::OwnershipType,
            crate::dao::models::GameStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game library and derived statistics"),
        (name = "platforms", description = "Gaming platforms"),
        (name = "tags", description = "Tags shared by games and sessions"),
        (name = "reviews", description = "Game reviews"),
        (name = "sessions", description = "Play sessions enriched with their references"),
        (name = "backup", description = "CSV export and import"),
        (name = "onboarding", description = "First-run default data"),
    )
)]
pub struct ApiDoc;
