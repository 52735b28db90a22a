//! Playtime aggregation over play sessions.
//!
//! Every function works on already-fetched sessions so the same rules apply to
//! per-game statistics and to the CSV export.

use indexmap::IndexMap;

use crate::{
    dao::models::{Game, PlaySession},
    dto::game::PlatformPlaytime,
};

/// Sum of valid session durations. Sessions without both bounds contribute nothing.
pub fn sessions_playtime<'a>(sessions: impl IntoIterator<Item = &'a PlaySession>) -> i64 {
    sessions
        .into_iter()
        .filter_map(|session| session.gaming_session.as_ref()?.duration_ms())
        .fold(0, i64::saturating_add)
}

/// Untracked baseline plus tracked sessions.
///
/// The baseline is only added when `platform_filtered` is false: it cannot be
/// attributed to a single platform.
pub fn total_playtime<'a>(
    game: Option<&Game>,
    sessions: impl IntoIterator<Item = &'a PlaySession>,
    platform_filtered: bool,
) -> i64 {
    let tracked = sessions_playtime(sessions);
    let untracked = if platform_filtered {
        0
    } else {
        game.and_then(|g| g.untracked_playtime).unwrap_or(0).max(0)
    };
    tracked.saturating_add(untracked)
}

/// Earliest start (or logging time when the start is unknown).
pub fn first_played(sessions: &[PlaySession]) -> Option<i64> {
    sessions
        .iter()
        .map(|session| {
            session
                .gaming_session
                .as_ref()
                .and_then(|gs| gs.start_time)
                .unwrap_or(session.transaction_epoch)
        })
        .filter(|epoch| *epoch != 0)
        .min()
}

/// Latest end (or logging time when the end is unknown).
pub fn last_played(sessions: &[PlaySession]) -> Option<i64> {
    sessions
        .iter()
        .map(|session| {
            session
                .gaming_session
                .as_ref()
                .and_then(|gs| gs.end_time)
                .unwrap_or(session.transaction_epoch)
        })
        .filter(|epoch| *epoch != 0)
        .max()
}

/// Mean duration of sessions with both bounds, 0 when there are none.
pub fn average_session_duration(sessions: &[PlaySession]) -> f64 {
    let durations: Vec<f64> = sessions
        .iter()
        .filter_map(|session| session.gaming_session.as_ref()?.duration_ms())
        .map(|duration| duration as f64)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Playtime and session count per platform, in order of first appearance.
pub fn platform_breakdown(sessions: &[PlaySession]) -> IndexMap<String, PlatformPlaytime> {
    let mut breakdown: IndexMap<String, PlatformPlaytime> = IndexMap::new();
    for gaming_session in sessions.iter().filter_map(|s| s.gaming_session.as_ref()) {
        if gaming_session.platform_id.is_empty() {
            continue;
        }
        let entry = breakdown
            .entry(gaming_session.platform_id.clone())
            .or_default();
        entry.playtime = entry
            .playtime
            .saturating_add(gaming_session.duration_ms().unwrap_or(0));
        entry.session_count += 1;
    }
    breakdown
}
