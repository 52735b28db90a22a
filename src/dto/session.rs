use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};

use crate::dao::models::{DocumentMeta, Game, GamingSession, PlaySession, Platform, Tag};

/// Gaming session with its game and platform resolved.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InferredGamingSession {
    /// Stored gaming session.
    #[serde(flatten)]
    pub session: GamingSession,
    /// Absent when the referenced game no longer exists.
    pub game: Option<Game>,
    /// Absent when the referenced platform no longer exists.
    pub platform: Option<Platform>,
}

/// Play session enriched with its referenced entities.
///
/// Built from an owned copy of the stored session, so enriching never touches the stored value.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InferredPlaySession {
    /// Session identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Free-form notes.
    pub notes: String,
    /// Ids of the attached tags.
    pub tag_id_list: Vec<String>,
    /// When the session was logged.
    pub transaction_epoch: i64,
    /// Gaming session with its game and platform.
    pub gaming_session: Option<InferredGamingSession>,
    /// Author of the last change.
    pub modified_by_username: Option<String>,
    /// Last save, in epoch milliseconds.
    pub modified_epoch: Option<i64>,
    /// Attached tags that still exist, in store order.
    pub tag_list: Vec<Tag>,
}

impl From<PlaySession> for InferredPlaySession {
    fn from(session: PlaySession) -> Self {
        let PlaySession {
            meta,
            notes,
            tag_id_list,
            transaction_epoch,
            gaming_session,
            modified_by_username,
            modified_epoch,
        } = session;

        Self {
            meta,
            notes,
            tag_id_list,
            transaction_epoch,
            gaming_session: gaming_session.map(|session| InferredGamingSession {
                session,
                game: None,
                platform: None,
            }),
            modified_by_username,
            modified_epoch,
            tag_list: Vec::new(),
        }
    }
}

/// Criteria applied by [`apply_filters`](crate::services::session_filters::apply_filters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaySessionFilters {
    /// Keep sessions carrying at least one of these tags. Ignored when empty.
    pub tag_id_allow_list: Vec<String>,
    /// Drop sessions carrying any of these tags. Ignored when empty.
    pub tag_id_deny_list: Vec<String>,
    /// Case-insensitive match on notes.
    pub search_string: String,
    /// Case-insensitive match on the whole serialized record.
    pub deep_search_string: String,
    /// Any instant of the first day to keep.
    pub start_epoch: i64,
    /// Any instant of the last day to keep.
    pub end_epoch: i64,
}

impl Default for PlaySessionFilters {
    fn default() -> Self {
        Self {
            tag_id_allow_list: Vec::new(),
            tag_id_deny_list: Vec::new(),
            search_string: String::new(),
            deep_search_string: String::new(),
            start_epoch: i64::MIN,
            end_epoch: i64::MAX,
        }
    }
}

/// Query string of `GET /sessions`. Tag lists are comma separated.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PlaySessionQuery {
    /// Tag ids a session must carry at least one of.
    pub tags: Option<String>,
    /// Tag ids a session must carry none of.
    pub exclude_tags: Option<String>,
    /// Case-insensitive text searched in the notes.
    pub search: Option<String>,
    /// Case-insensitive text searched in the whole enriched session.
    pub deep_search: Option<String>,
    /// Earliest day, in epoch milliseconds.
    pub start: Option<i64>,
    /// Latest day, in epoch milliseconds.
    pub end: Option<i64>,
}

fn split_ids(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

impl PlaySessionQuery {
    /// `None` when no criterion is set, so the listing is returned unfiltered.
    pub fn into_filters(self) -> Option<PlaySessionFilters> {
        let Self {
            tags,
            exclude_tags,
            search,
            deep_search,
            start,
            end,
        } = self;

        if tags.is_none()
            && exclude_tags.is_none()
            && search.is_none()
            && deep_search.is_none()
            && start.is_none()
            && end.is_none()
        {
            return None;
        }

        let defaults = PlaySessionFilters::default();
        Some(PlaySessionFilters {
            tag_id_allow_list: split_ids(tags),
            tag_id_deny_list: split_ids(exclude_tags),
            search_string: search.unwrap_or_default(),
            deep_search_string: deep_search.unwrap_or_default(),
            start_epoch: start.unwrap_or(defaults.start_epoch),
            end_epoch: end.unwrap_or(defaults.end_epoch),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_means_no_filters() {
        assert!(PlaySessionQuery::default().into_filters().is_none());
    }

    #[test]
    fn tag_lists_are_split_and_trimmed() {
        let filters = PlaySessionQuery {
            tags: Some("a, b,,c ".into()),
            ..Default::default()
        }
        .into_filters()
        .unwrap();
        assert_eq!(filters.tag_id_allow_list, vec!["a", "b", "c"]);
        assert!(filters.tag_id_deny_list.is_empty());
        assert_eq!(filters.start_epoch, i64::MIN);
        assert_eq!(filters.end_epoch, i64::MAX);
    }

    #[test]
    fn conversion_keeps_cached_names() {
        let session = PlaySession {
            notes: "boss fight".into(),
            gaming_session: Some(GamingSession {
                game_id: "g1".into(),
                game_name: Some("Halo".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let inferred = InferredPlaySession::from(session);
        let json = serde_json::to_value(&inferred).unwrap();
        assert_eq!(json["gamingSession"]["_gameName"], "Halo");
        assert_eq!(json["gamingSession"]["gameId"], "g1");
        assert!(json["gamingSession"].get("game").is_none());
        assert_eq!(json["tagList"], serde_json::json!([]));
    }
}
