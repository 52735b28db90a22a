use std::collections::HashMap;

use crate::dao::models::{Collection, Entity, Game, Platform, Tag};

/// Entity held by an [`EntityMap`].
#[derive(Debug, Clone)]
pub enum EntityRef {
    /// A tag.
    Tag(Tag),
    /// A game.
    Game(Game),
    /// A platform.
    Platform(Platform),
}

/// Lookup table of every tag, game and platform, keyed by `"<collection>-<id>"`.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    entries: HashMap<String, EntityRef>,
}

impl EntityMap {
    /// Map key of an entity.
    pub fn key(collection: Collection, id: &str) -> String {
        format!("{collection}-{id}")
    }

    /// Build the map from full listings of each collection.
    pub fn from_listings(tags: Vec<Tag>, games: Vec<Game>, platforms: Vec<Platform>) -> Self {
        let mut map = Self::default();
        for tag in tags {
            map.insert(tag, EntityRef::Tag);
        }
        for game in games {
            map.insert(game, EntityRef::Game);
        }
        for platform in platforms {
            map.insert(platform, EntityRef::Platform);
        }
        map
    }

    fn insert<E: Entity>(&mut self, entity: E, wrap: fn(E) -> EntityRef) {
        if let Some(id) = entity.id() {
            let key = Self::key(E::COLLECTION, id);
            self.entries.insert(key, wrap(entity));
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Game stored under `id`.
    pub fn game(&self, id: &str) -> Option<&Game> {
        match self.entries.get(&Self::key(Collection::Game, id)) {
            Some(EntityRef::Game(game)) => Some(game),
            _ => None,
        }
    }

    /// Platform stored under `id`.
    pub fn platform(&self, id: &str) -> Option<&Platform> {
        match self.entries.get(&Self::key(Collection::Platform, id)) {
            Some(EntityRef::Platform(platform)) => Some(platform),
            _ => None,
        }
    }

    /// Tag stored under `id`.
    pub fn tag(&self, id: &str) -> Option<&Tag> {
        match self.entries.get(&Self::key(Collection::Tag, id)) {
            Some(EntityRef::Tag(tag)) => Some(tag),
            _ => None,
        }
    }
}
