use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};

use crate::dao::models::GameStatus;

/// Accumulated playtime of a game on one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPlaytime {
    /// Milliseconds.
    pub playtime: i64,
    /// Sessions logged on the platform.
    pub session_count: u32,
}

/// Derived statistics of a game.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Game the statistics belong to.
    pub game_id: String,
    /// Untracked baseline plus tracked sessions, in milliseconds.
    pub total_playtime: i64,
    /// Earliest session start, in epoch milliseconds.
    pub first_played_date: Option<i64>,
    /// Latest session end, in epoch milliseconds.
    pub last_played_date: Option<i64>,
    /// Milliseconds, 0 without complete sessions.
    pub average_session_duration: f64,
    /// Sessions logged for the game.
    pub session_count: usize,
    /// Playtime per platform id, in order of first session.
    pub platform_breakdown: IndexMap<String, PlatformPlaytime>,
}

/// Status change appended to a game's history.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    /// Platform the status applies to.
    pub platform_id: String,
    /// Status entered.
    pub status: GameStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Optional platform restriction for history queries.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PlatformQuery {
    /// Restrict to one platform.
    pub platform_id: Option<String>,
}

/// Optional revision supplied to delete routes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevisionQuery {
    /// When given, must match the stored revision.
    pub rev: Option<String>,
}
