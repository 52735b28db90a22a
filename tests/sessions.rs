use std::{collections::HashSet, sync::Arc};

use time::UtcOffset;

use playloop_back::{
    dao::{
        document_store::{DocumentStore, memory::MemoryDocumentStore},
        models::{Game, GamingSession, PlaySession, Platform, Tag},
        repository::Repository,
        storage::StorageError,
    },
    dto::session::{InferredPlaySession, PlaySessionFilters},
    services::{game_service::GameService, play_session_service::PlaySessionService},
};

const HOUR: i64 = 3_600_000;
// 2024-03-10T00:00:00Z
const MARCH_10: i64 = 1_710_028_800_000;

struct Fixture {
    store: Arc<dyn DocumentStore>,
    games: GameService,
    sessions: PlaySessionService,
    game_id: String,
    platform_ids: [String; 2],
    tag_ids: [String; 2],
}

async fn fixture() -> Fixture {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let games = GameService::new(store.clone());
    let sessions = PlaySessionService::new(store.clone(), UtcOffset::UTC);

    let platforms = Repository::<Platform>::new(store.clone());
    let tags = Repository::<Tag>::new(store.clone());

    let mut platform_ids = Vec::new();
    for name in ["PC", "Steam Deck"] {
        let saved = platforms
            .save(Platform {
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
        platform_ids.push(saved.meta.id.unwrap());
    }

    let mut tag_ids = Vec::new();
    for name in ["Co-op", "Speedrun"] {
        tag_ids.push(tags.save(Tag::new(name)).await.unwrap().meta.id.unwrap());
    }

    let game = games
        .save(Game {
            name: "Hades".into(),
            platform_id_list: platform_ids.clone(),
            untracked_playtime: Some(10 * HOUR),
            ..Default::default()
        })
        .await
        .unwrap();

    Fixture {
        store,
        games,
        sessions,
        game_id: game.meta.id.unwrap(),
        platform_ids: [platform_ids[0].clone(), platform_ids[1].clone()],
        tag_ids: [tag_ids[0].clone(), tag_ids[1].clone()],
    }
}

fn session(
    fx: &Fixture,
    platform: usize,
    start: i64,
    hours: i64,
    notes: &str,
    tags: &[usize],
) -> PlaySession {
    PlaySession {
        notes: notes.into(),
        tag_id_list: tags.iter().map(|&i| fx.tag_ids[i].clone()).collect(),
        transaction_epoch: start,
        gaming_session: Some(GamingSession {
            game_id: fx.game_id.clone(),
            platform_id: fx.platform_ids[platform].clone(),
            start_time: Some(start),
            end_time: Some(start + hours * HOUR),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn tag_names(inferred: &InferredPlaySession) -> HashSet<String> {
    inferred.tag_list.iter().map(|t| t.name.clone()).collect()
}

#[tokio::test]
async fn playtime_combines_untracked_baseline_and_sessions() {
    let fx = fixture().await;
    fx.sessions
        .save(session(&fx, 0, MARCH_10, 1, "", &[]))
        .await
        .unwrap();
    fx.sessions
        .save(session(&fx, 1, MARCH_10 + 5 * HOUR, 2, "", &[]))
        .await
        .unwrap();

    assert_eq!(fx.games.total_playtime(&fx.game_id, None).await.unwrap(), 13 * HOUR);
    assert_eq!(
        fx.games
            .total_playtime(&fx.game_id, Some(fx.platform_ids[1].as_str()))
            .await
            .unwrap(),
        2 * HOUR
    );
    assert_eq!(
        fx.games.average_session_duration(&fx.game_id).await.unwrap(),
        1.5 * HOUR as f64
    );

    let stats = fx.games.stats(&fx.game_id).await.unwrap();
    assert_eq!(stats.session_count, 2);
    assert_eq!(stats.first_played_date, Some(MARCH_10));
    assert_eq!(stats.last_played_date, Some(MARCH_10 + 7 * HOUR));
    assert_eq!(stats.platform_breakdown[&fx.platform_ids[0]].playtime, HOUR);
    assert_eq!(stats.platform_breakdown[&fx.platform_ids[1]].session_count, 1);
}

#[tokio::test]
async fn batch_inference_agrees_with_point_lookups() {
    let fx = fixture().await;
    fx.sessions
        .save(session(&fx, 0, MARCH_10, 1, "first run", &[1, 0]))
        .await
        .unwrap();
    fx.sessions
        .save(session(&fx, 1, MARCH_10 + HOUR, 1, "", &[0]))
        .await
        .unwrap();
    let mut dangling = session(&fx, 0, MARCH_10 + 2 * HOUR, 1, "", &[]);
    dangling.tag_id_list.push("no-such-tag".into());
    fx.sessions.save(dangling).await.unwrap();

    let stored = fx.sessions.list().await.unwrap();
    let batch = fx.sessions.infer_in_batch(&stored, None).await.unwrap();
    assert_eq!(batch.len(), stored.len());

    for (session, from_batch) in stored.iter().zip(&batch) {
        let single = fx.sessions.infer(session).await.unwrap();
        assert_eq!(single.meta, from_batch.meta);

        let single_gs = single.gaming_session.as_ref().unwrap();
        let batch_gs = from_batch.gaming_session.as_ref().unwrap();
        assert_eq!(single_gs.game, batch_gs.game);
        assert_eq!(single_gs.platform, batch_gs.platform);
        assert_eq!(batch_gs.game.as_ref().unwrap().name, "Hades");

        assert_eq!(tag_names(&single), tag_names(from_batch));
    }
}

#[tokio::test]
async fn cached_names_are_written_on_save() {
    let fx = fixture().await;
    let saved = fx
        .sessions
        .save(session(&fx, 1, MARCH_10, 1, "", &[]))
        .await
        .unwrap();

    let gaming_session = saved.gaming_session.unwrap();
    assert_eq!(gaming_session.game_name.as_deref(), Some("Hades"));
    assert_eq!(gaming_session.platform_name.as_deref(), Some("Steam Deck"));
    assert!(saved.modified_epoch.is_some());
}

#[tokio::test]
async fn filtered_listing_applies_deny_after_allow() {
    let fx = fixture().await;
    fx.sessions
        .save(session(&fx, 0, MARCH_10, 1, "co-op night", &[0]))
        .await
        .unwrap();
    fx.sessions
        .save(session(&fx, 0, MARCH_10 + HOUR, 1, "any% attempt", &[0, 1]))
        .await
        .unwrap();
    fx.sessions
        .save(session(&fx, 1, MARCH_10 + 30 * 24 * HOUR, 1, "co-op rematch", &[0]))
        .await
        .unwrap();

    let filters = PlaySessionFilters {
        tag_id_allow_list: vec![fx.tag_ids[0].clone()],
        tag_id_deny_list: vec![fx.tag_ids[1].clone()],
        ..Default::default()
    };
    let listed = fx.sessions.list_inferred(Some(&filters)).await.unwrap();
    let notes: Vec<_> = listed.iter().map(|s| s.notes.as_str()).collect();
    assert_eq!(notes, vec!["co-op rematch", "co-op night"]);

    let same_day = PlaySessionFilters {
        search_string: "CO-OP".into(),
        start_epoch: MARCH_10 + 12 * HOUR,
        end_epoch: MARCH_10 + 12 * HOUR,
        ..Default::default()
    };
    let listed = fx.sessions.list_inferred(Some(&same_day)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].notes, "co-op night");

    let deep = PlaySessionFilters {
        deep_search_string: "steam deck".into(),
        ..Default::default()
    };
    let listed = fx.sessions.list_inferred(Some(&deep)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].notes, "co-op rematch");

    assert_eq!(fx.sessions.list_inferred(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn stale_revisions_are_rejected() {
    let fx = fixture().await;
    let games = Repository::<Game>::new(fx.store.clone());

    let original = fx.games.require(&fx.game_id).await.unwrap();
    let mut renamed = original.clone();
    renamed.name = "Hades II".into();
    let renamed = games.save(renamed).await.unwrap();
    assert_ne!(renamed.meta.rev, original.meta.rev);

    let mut stale = original.clone();
    stale.name = "Hades (stale)".into();
    assert!(matches!(
        games.save(stale).await,
        Err(StorageError::Conflict { .. })
    ));
    assert!(matches!(
        games.delete(original).await,
        Err(StorageError::Conflict { .. })
    ));

    games.delete(renamed).await.unwrap();
    assert!(games.find(&fx.game_id).await.unwrap().is_none());
}

#[tokio::test]
async fn ids_of_other_collections_do_not_resolve() {
    let fx = fixture().await;
    let platforms = Repository::<Platform>::new(fx.store.clone());

    assert!(platforms.find(&fx.game_id).await.unwrap().is_none());
    assert!(platforms.find(&fx.platform_ids[0]).await.unwrap().is_some());
}
