use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::dao::storage::StorageError;

/// Color assigned to tags created without an explicit one.
pub const DEFAULT_TAG_COLOR: &str = "#444444";

/// Discriminator stored in the `$collection` field of every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    /// Games of the library.
    Game,
    /// Consoles, PCs and handhelds.
    Platform,
    /// Colored labels.
    Tag,
    /// Logged play sessions.
    PlaySession,
    /// Status changes of a game on a platform.
    GameStatusHistory,
    /// Written reviews.
    Review,
}

impl Collection {
    /// Wire name of the collection, as persisted in `$collection`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Game => "game",
            Collection::Platform => "platform",
            Collection::Tag => "tag",
            Collection::PlaySession => "play-session",
            Collection::GameStatusHistory => "game-status-history",
            Collection::Review => "review",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and concurrency token shared by every persisted document.
///
/// Both fields stay `None` until the document has been saved once.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentMeta {
    /// Document id, assigned on first save.
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Revision token the next write must present.
    #[serde(rename = "_rev")]
    pub rev: Option<String>,
}

/// How a game copy is held on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipType {
    /// Bought and kept.
    #[default]
    Owned,
    /// Borrowed from someone else.
    Borrowed,
    /// Rented for a limited time.
    Rented,
    /// Received as a gift.
    Gifted,
    /// Anything else.
    Other,
}

impl OwnershipType {
    /// Wire name of the ownership type.
    pub const fn as_str(self) -> &'static str {
        match self {
            OwnershipType::Owned => "owned",
            OwnershipType::Borrowed => "borrowed",
            OwnershipType::Rented => "rented",
            OwnershipType::Gifted => "gifted",
            OwnershipType::Other => "other",
        }
    }

    /// Parse a case-insensitive ownership label, returning `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "owned" => Some(OwnershipType::Owned),
            "borrowed" => Some(OwnershipType::Borrowed),
            "rented" => Some(OwnershipType::Rented),
            "gifted" => Some(OwnershipType::Gifted),
            "other" => Some(OwnershipType::Other),
            _ => None,
        }
    }
}

/// Progress status of a game on a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    /// Finished.
    Completed,
    /// Currently being played.
    InProgress,
    /// Paused for now.
    OnHold,
    /// Abandoned.
    Dropped,
}

impl GameStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            GameStatus::Completed => "completed",
            GameStatus::InProgress => "in-progress",
            GameStatus::OnHold => "on-hold",
            GameStatus::Dropped => "dropped",
        }
    }

    /// Parse an exact status label (`completed`, `in-progress`, `on-hold`, `dropped`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(GameStatus::Completed),
            "in-progress" => Some(GameStatus::InProgress),
            "on-hold" => Some(GameStatus::OnHold),
            "dropped" => Some(GameStatus::Dropped),
            _ => None,
        }
    }
}

/// Ownership of a game on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipEntry {
    /// Platform the copy is held on.
    pub platform_id: String,
    /// How the copy is held.
    #[serde(default)]
    pub ownership_type: OwnershipType,
}

/// Status recorded for a platform before play sessions were tracked.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UntrackedHistoryEntry {
    /// Platform the status applies to.
    pub platform_id: String,
    /// Status reached before tracking began.
    pub status: GameStatus,
    /// Last time played, in epoch milliseconds.
    pub last_played_date: Option<i64>,
}

/// A game of the library. Platforms and tags are referenced by id.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Display name, unique across games.
    pub name: String,
    /// Legacy flat platform list, kept alongside `ownership_list`.
    #[serde(default)]
    pub platform_id_list: Vec<String>,
    /// Platforms the game is owned on, with the ownership type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ownership_list: Vec<OwnershipEntry>,
    /// Statuses recorded before play sessions were tracked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub untracked_history_list: Vec<UntrackedHistoryEntry>,
    /// Milliseconds played before tracking began.
    pub untracked_playtime: Option<i64>,
    /// Ids of the tags attached to the game.
    #[serde(default)]
    pub tag_id_list: Vec<String>,
    /// 0 to 10 in steps of 0.5.
    pub rating: Option<f64>,
    /// Release date in epoch milliseconds.
    pub release_date: Option<i64>,
    /// Whether the game counts as retro.
    #[serde(default)]
    pub is_retro_game: bool,
}

/// A gaming platform (console, PC, handheld...).
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Display name, unique across platforms.
    pub name: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A colored label attached to games and play sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Display name.
    pub name: String,
    /// Hex color (`#rrggbb`).
    #[serde(default = "default_tag_color")]
    pub color: String,
}

impl Tag {
    /// Unsaved tag with the default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: DocumentMeta::default(),
            name: name.into(),
            color: default_tag_color(),
        }
    }
}

fn default_tag_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

/// Game and platform played during a session.
///
/// `_gameName` and `_platformName` are display snapshots only; the ids are authoritative.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GamingSession {
    /// Game played.
    #[serde(default)]
    pub game_id: String,
    /// Platform played on. Empty when unknown.
    #[serde(default)]
    pub platform_id: String,
    /// Start in epoch milliseconds.
    pub start_time: Option<i64>,
    /// End in epoch milliseconds.
    pub end_time: Option<i64>,
    /// Game name at the last save.
    #[serde(rename = "_gameName")]
    pub game_name: Option<String>,
    /// Platform name at the last save.
    #[serde(rename = "_platformName")]
    pub platform_name: Option<String>,
}

impl GamingSession {
    /// Played duration when both bounds are known. Inverted bounds count as zero.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start).max(0)),
            _ => None,
        }
    }
}

/// A logged play session.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaySession {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Free-form notes, searched by the text filters.
    #[serde(default)]
    pub notes: String,
    /// Ids of the tags attached to the session.
    #[serde(default)]
    pub tag_id_list: Vec<String>,
    /// When the record was logged.
    #[serde(default)]
    pub transaction_epoch: i64,
    /// What was played, when and where.
    pub gaming_session: Option<GamingSession>,
    /// Author of the last change.
    pub modified_by_username: Option<String>,
    /// Last save, in epoch milliseconds.
    pub modified_epoch: Option<i64>,
}

/// Append-only status log entry for a (game, platform) pair.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStatusHistory {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Game whose status changed.
    pub game_id: String,
    /// Platform the status applies to.
    pub platform_id: String,
    /// Status entered.
    pub status: GameStatus,
    /// When the status was entered, in epoch milliseconds.
    pub timestamp: i64,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Per-aspect scores of a review, each 0 to 10.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatings {
    /// Story and writing.
    pub story: Option<f64>,
    /// Gameplay.
    pub gameplay: Option<f64>,
    /// Novelty.
    pub novelty: Option<f64>,
    /// Music and sound.
    pub music: Option<f64>,
    /// Art direction.
    pub art_design: Option<f64>,
    /// Graphics.
    pub graphics: Option<f64>,
    /// Technical performance.
    pub performance: Option<f64>,
    /// Characters.
    pub characters: Option<f64>,
}

impl AspectRatings {
    /// Aspect scores paired with their wire names.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("story", self.story),
            ("gameplay", self.gameplay),
            ("novelty", self.novelty),
            ("music", self.music),
            ("artDesign", self.art_design),
            ("graphics", self.graphics),
            ("performance", self.performance),
            ("characters", self.characters),
        ]
    }
}

/// Review measures that are not quality scores.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetrics {
    /// Perceived difficulty.
    pub difficulty: Option<f64>,
    /// Nostalgia value.
    pub nostalgia: Option<f64>,
}

/// Written review of a game.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Document identity.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Reviewed game.
    #[serde(default)]
    pub game_id: String,
    /// Review body.
    pub review_text: Option<String>,
    /// Per-aspect scores.
    #[serde(default)]
    pub aspect_ratings: AspectRatings,
    /// Difficulty and nostalgia.
    #[serde(default)]
    pub metrics: ReviewMetrics,
    /// Date of the review, in epoch milliseconds.
    pub date_reviewed: Option<i64>,
    /// Set once, on first save.
    pub created_at: Option<i64>,
    /// Refreshed on every save.
    pub updated_at: Option<i64>,
}

/// Heterogeneous document as persisted by a [`DocumentStore`](crate::dao::document_store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$collection", rename_all = "kebab-case")]
pub enum Document {
    /// A game.
    Game(Game),
    /// A platform.
    Platform(Platform),
    /// A tag.
    Tag(Tag),
    /// A play session.
    PlaySession(PlaySession),
    /// A status history entry.
    GameStatusHistory(GameStatusHistory),
    /// A review.
    Review(Review),
}

impl Document {
    /// Collection of the wrapped entity.
    pub fn collection(&self) -> Collection {
        match self {
            Document::Game(_) => Collection::Game,
            Document::Platform(_) => Collection::Platform,
            Document::Tag(_) => Collection::Tag,
            Document::PlaySession(_) => Collection::PlaySession,
            Document::GameStatusHistory(_) => Collection::GameStatusHistory,
            Document::Review(_) => Collection::Review,
        }
    }

    /// Identity of the wrapped entity.
    pub fn meta(&self) -> &DocumentMeta {
        match self {
            Document::Game(doc) => &doc.meta,
            Document::Platform(doc) => &doc.meta,
            Document::Tag(doc) => &doc.meta,
            Document::PlaySession(doc) => &doc.meta,
            Document::GameStatusHistory(doc) => &doc.meta,
            Document::Review(doc) => &doc.meta,
        }
    }

    /// Mutable identity of the wrapped entity.
    pub fn meta_mut(&mut self) -> &mut DocumentMeta {
        match self {
            Document::Game(doc) => &mut doc.meta,
            Document::Platform(doc) => &mut doc.meta,
            Document::Tag(doc) => &mut doc.meta,
            Document::PlaySession(doc) => &mut doc.meta,
            Document::GameStatusHistory(doc) => &mut doc.meta,
            Document::Review(doc) => &mut doc.meta,
        }
    }

    /// Document id, if saved.
    pub fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    /// Current revision, if saved.
    pub fn rev(&self) -> Option<&str> {
        self.meta().rev.as_deref()
    }
}

/// Typed view over one variant of [`Document`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Collection every value of this type is stored under.
    const COLLECTION: Collection;

    /// Identity of the entity.
    fn meta(&self) -> &DocumentMeta;

    /// Mutable identity of the entity.
    fn meta_mut(&mut self) -> &mut DocumentMeta;

    /// Wrap into the matching [`Document`] variant.
    fn into_document(self) -> Document;

    /// Narrow a document to this type, failing when it belongs to another collection.
    fn from_document(document: Document) -> Result<Self, StorageError>;

    /// Document id, if saved.
    fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }
}

macro_rules! impl_entity {
    ($ty:ident, $collection:ident) => {
        impl Entity for $ty {
            const COLLECTION: Collection = Collection::$collection;

            fn meta(&self) -> &DocumentMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut DocumentMeta {
                &mut self.meta
            }

            fn into_document(self) -> Document {
                Document::$collection(self)
            }

            fn from_document(document: Document) -> Result<Self, StorageError> {
                match document {
                    Document::$collection(entity) => Ok(entity),
                    other => Err(StorageError::CollectionMismatch {
                        id: other.id().unwrap_or_default().to_string(),
                        expected: Collection::$collection,
                        actual: other.collection(),
                    }),
                }
            }
        }
    };
}

impl_entity!(Game, Game);
impl_entity!(Platform, Platform);
impl_entity!(Tag, Tag);
impl_entity!(PlaySession, PlaySession);
impl_entity!(GameStatusHistory, GameStatusHistory);
impl_entity!(Review, Review);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_round_trips_through_collection_tag() {
        let raw = json!({
            "_id": "g1",
            "_rev": "1-abc",
            "$collection": "game",
            "name": "Halo",
            "platformIdList": ["p1"],
            "isRetroGame": false
        });

        let document: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(document.collection(), Collection::Game);
        assert_eq!(document.id(), Some("g1"));
        assert_eq!(document.rev(), Some("1-abc"));

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["$collection"], "game");
        assert_eq!(value["_id"], "g1");
        assert_eq!(value["platformIdList"], json!(["p1"]));
        assert!(value.get("rating").is_none());
    }

    #[test]
    fn play_session_keeps_display_cache_field_names() {
        let raw = json!({
            "$collection": "play-session",
            "notes": "late night",
            "tagIdList": [],
            "transactionEpoch": 10,
            "gamingSession": {
                "gameId": "g1",
                "platformId": "p1",
                "startTime": 0,
                "endTime": 3_600_000,
                "_gameName": "Halo"
            }
        });

        let document: Document = serde_json::from_value(raw).unwrap();
        let Document::PlaySession(session) = document else {
            panic!("expected a play session");
        };
        let gaming = session.gaming_session.unwrap();
        assert_eq!(gaming.game_name.as_deref(), Some("Halo"));
        assert_eq!(gaming.duration_ms(), Some(3_600_000));
    }

    #[test]
    fn inverted_session_bounds_yield_zero_duration() {
        let gaming = GamingSession {
            start_time: Some(5_000),
            end_time: Some(1_000),
            ..Default::default()
        };
        assert_eq!(gaming.duration_ms(), Some(0));
    }

    #[test]
    fn from_document_rejects_other_collections() {
        let document = Tag::new("Favorite").into_document();
        let err = Platform::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            StorageError::CollectionMismatch {
                expected: Collection::Platform,
                actual: Collection::Tag,
                ..
            }
        ));
    }

    #[test]
    fn tag_color_defaults_when_missing() {
        let tag: Tag = serde_json::from_value(json!({"name": "Retro"})).unwrap();
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);
    }

    #[test]
    fn ownership_parsing_is_case_insensitive() {
        assert_eq!(OwnershipType::parse("Borrowed"), Some(OwnershipType::Borrowed));
        assert_eq!(OwnershipType::parse("stolen"), None);
        assert_eq!(GameStatus::parse("on-hold"), Some(GameStatus::OnHold));
        assert_eq!(GameStatus::parse("paused"), None);
    }
}
