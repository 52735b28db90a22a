//! Play session filtering.
//!
//! Predicates run in a fixed order: tag allow-list, tag deny-list, notes
//! search, deep search, then the day range.

use std::collections::HashSet;

use time::UtcOffset;

use crate::{
    dao::models::PlaySession,
    dto::session::PlaySessionFilters,
    services::dates::normalize_epoch_range,
};

fn any_tag_in(session: &PlaySession, tags: &HashSet<&str>) -> bool {
    session
        .tag_id_list
        .iter()
        .any(|id| tags.contains(id.as_str()))
}

fn deep_match(session: &PlaySession, needle: &str) -> bool {
    serde_json::to_string(session)
        .map(|raw| raw.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Apply `filters` to in-memory sessions, preserving input order. `None` keeps everything.
pub fn apply_filters(
    sessions: Vec<PlaySession>,
    filters: Option<&PlaySessionFilters>,
    day_offset: UtcOffset,
) -> Vec<PlaySession> {
    let Some(filters) = filters else {
        return sessions;
    };

    let mut sessions = sessions;

    if !filters.tag_id_allow_list.is_empty() {
        let allowed: HashSet<&str> = filters.tag_id_allow_list.iter().map(String::as_str).collect();
        sessions.retain(|session| any_tag_in(session, &allowed));
    }

    if !filters.tag_id_deny_list.is_empty() {
        let denied: HashSet<&str> = filters.tag_id_deny_list.iter().map(String::as_str).collect();
        sessions.retain(|session| !any_tag_in(session, &denied));
    }

    if !filters.search_string.is_empty() {
        let needle = filters.search_string.to_lowercase();
        sessions.retain(|session| {
            !session.notes.is_empty() && session.notes.to_lowercase().contains(&needle)
        });
    }

    if !filters.deep_search_string.is_empty() {
        let needle = filters.deep_search_string.to_lowercase();
        sessions.retain(|session| deep_match(session, &needle));
    }

    let (start, end) = normalize_epoch_range(filters.start_epoch, filters.end_epoch, day_offset);
    sessions.retain(|session| (start..=end).contains(&session.transaction_epoch));

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::GamingSession;

    // 2024-03-10T15:30:00Z
    const AFTERNOON: i64 = 1_710_084_600_000;
    const DAY: i64 = 86_400_000;

    fn session(notes: &str, tags: &[&str], logged: i64) -> PlaySession {
        PlaySession {
            notes: notes.into(),
            tag_id_list: tags.iter().map(|t| t.to_string()).collect(),
            transaction_epoch: logged,
            gaming_session: Some(GamingSession {
                game_id: "g1".into(),
                platform_id: "p1".into(),
                game_name: Some("Hollow Knight".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn notes(sessions: &[PlaySession]) -> Vec<&str> {
        sessions.iter().map(|s| s.notes.as_str()).collect()
    }

    #[test]
    fn no_filters_keeps_everything() {
        let sessions = vec![session("a", &[], 1), session("b", &[], 2)];
        assert_eq!(apply_filters(sessions.clone(), None, UtcOffset::UTC), sessions);
    }

    #[test]
    fn deny_list_runs_after_allow_list() {
        // "both" carries an allowed and a denied tag: allow keeps it, deny then drops it.
        let sessions = vec![
            session("allowed", &["fun"], AFTERNOON),
            session("both", &["fun", "boring"], AFTERNOON),
            session("denied", &["boring"], AFTERNOON),
            session("untagged", &[], AFTERNOON),
        ];
        let filters = PlaySessionFilters {
            tag_id_allow_list: vec!["fun".into()],
            tag_id_deny_list: vec!["boring".into()],
            ..Default::default()
        };

        let kept = apply_filters(sessions, Some(&filters), UtcOffset::UTC);
        assert_eq!(notes(&kept), vec!["allowed"]);
    }

    #[test]
    fn shallow_search_only_looks_at_notes() {
        let sessions = vec![
            session("Beat the BOSS", &[], AFTERNOON),
            session("", &[], AFTERNOON),
        ];
        let filters = PlaySessionFilters {
            search_string: "boss".into(),
            ..Default::default()
        };
        assert_eq!(
            notes(&apply_filters(sessions.clone(), Some(&filters), UtcOffset::UTC)),
            vec!["Beat the BOSS"]
        );

        let filters = PlaySessionFilters {
            search_string: "hollow".into(),
            ..Default::default()
        };
        assert!(apply_filters(sessions, Some(&filters), UtcOffset::UTC).is_empty());
    }

    #[test]
    fn deep_search_matches_cached_names() {
        let sessions = vec![session("", &[], AFTERNOON)];
        let filters = PlaySessionFilters {
            deep_search_string: "HOLLOW".into(),
            ..Default::default()
        };
        assert_eq!(apply_filters(sessions, Some(&filters), UtcOffset::UTC).len(), 1);
    }

    #[test]
    fn day_range_is_inclusive_of_whole_days() {
        let sessions = vec![
            session("day before", &[], AFTERNOON - DAY),
            session("morning", &[], AFTERNOON - 15 * 3_600_000),
            session("night", &[], AFTERNOON + 8 * 3_600_000),
            session("day after", &[], AFTERNOON + DAY),
        ];
        let filters = PlaySessionFilters {
            start_epoch: AFTERNOON,
            end_epoch: AFTERNOON,
            ..Default::default()
        };

        let kept = apply_filters(sessions, Some(&filters), UtcOffset::UTC);
        assert_eq!(notes(&kept), vec!["morning", "night"]);
    }
}
