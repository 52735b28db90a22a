use std::sync::Arc;

use playloop_back::{
    dao::{
        document_store::{DocumentStore, memory::MemoryDocumentStore},
        models::{
            DocumentMeta, Game, GameStatus, OwnershipEntry, OwnershipType, Platform, Tag,
            UntrackedHistoryEntry,
        },
    },
    services::{
        backup_service::BackupService, game_service::GameService,
        platform_service::PlatformService, tag_service::TagService,
    },
};

struct Library {
    backup: BackupService,
    games: GameService,
    platforms: PlatformService,
    tags: TagService,
}

fn library() -> Library {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    Library {
        backup: BackupService::new(store.clone()),
        games: GameService::new(store.clone()),
        platforms: PlatformService::new(store.clone()),
        tags: TagService::new(store),
    }
}

async fn platform(lib: &Library, name: &str) -> String {
    lib.platforms
        .save(Platform {
            name: name.into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .meta
        .id
        .unwrap()
}

async fn seed(lib: &Library) -> usize {
    let xbox = platform(lib, "Xbox").await;
    let pc = platform(lib, "PC").await;
    let favorite = lib
        .tags
        .save(Tag::new("Favorite"))
        .await
        .unwrap()
        .meta
        .id
        .unwrap();

    let games = vec![
        Game {
            name: "Halo".into(),
            platform_id_list: vec![xbox.clone()],
            ..Default::default()
        },
        Game {
            name: "Portal, Still Alive".into(),
            platform_id_list: vec![pc.clone(), xbox.clone()],
            ownership_list: vec![
                OwnershipEntry {
                    platform_id: pc.clone(),
                    ownership_type: OwnershipType::Gifted,
                },
                OwnershipEntry {
                    platform_id: xbox.clone(),
                    ownership_type: OwnershipType::Owned,
                },
            ],
            untracked_history_list: vec![UntrackedHistoryEntry {
                platform_id: pc,
                status: GameStatus::Completed,
                last_played_date: Some(1_710_028_800_000),
            }],
            untracked_playtime: Some(9_000_000),
            tag_id_list: vec![favorite],
            rating: Some(9.5),
            release_date: Some(1_192_060_800_000),
            is_retro_game: true,
            ..Default::default()
        },
    ];

    let count = games.len();
    for game in games {
        lib.games.save(game).await.unwrap();
    }
    count
}

#[tokio::test]
async fn halo_exports_one_row_and_imports_into_an_empty_library() {
    let source = library();
    let xbox = platform(&source, "Xbox").await;
    source
        .games
        .save(Game {
            name: "Halo".into(),
            platform_id_list: vec![xbox],
            is_retro_game: false,
            ..Default::default()
        })
        .await
        .unwrap();

    let csv = source.backup.export_csv().await.unwrap();
    assert_eq!(
        csv,
        "Name,Rating,ReleaseDate,IsRetroGame,Tags,TotalPlaytimeHours,Platform1,Ownership1,Status1,LastPlayed1\n\
         Halo,,,No,,,Xbox,owned,,"
    );

    let target = library();
    let report = target.backup.import_csv(&csv).await.unwrap();
    assert_eq!(report.games_created, 1);
    assert_eq!(report.games_skipped, 0);
    assert_eq!(report.platforms_created, 1);
    assert!(report.errors.is_empty());

    let games = target.games.list().await.unwrap();
    let platforms = target.platforms.list().await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(platforms[0].name, "Xbox");
    assert_eq!(games[0].platform_id_list, vec![platforms[0].meta.id.clone().unwrap()]);
    assert_eq!(games[0].ownership_list[0].ownership_type, OwnershipType::Owned);
}

#[tokio::test]
async fn reimporting_an_export_without_games_recreates_only_games() {
    let lib = library();
    let original = seed(&lib).await;
    let csv = lib.backup.export_csv().await.unwrap();

    for game in lib.games.list().await.unwrap() {
        lib.games.delete(game).await.unwrap();
    }

    let report = lib.backup.import_csv(&csv).await.unwrap();
    assert_eq!(report.games_created, original);
    assert_eq!(report.games_skipped, 0);
    assert_eq!(report.platforms_created, 0);
    assert_eq!(report.tags_created, 0);
    assert!(report.errors.is_empty());

    let games = lib.games.list().await.unwrap();
    let portal = games
        .iter()
        .find(|g| g.name == "Portal, Still Alive")
        .unwrap();
    assert_eq!(portal.rating, Some(9.5));
    assert!(portal.is_retro_game);
    assert_eq!(portal.untracked_playtime, Some(9_000_000));
    assert_eq!(portal.release_date, Some(1_192_060_800_000));
    assert_eq!(portal.tag_id_list.len(), 1);
    assert_eq!(portal.ownership_list.len(), 2);
    assert_eq!(portal.ownership_list[0].ownership_type, OwnershipType::Gifted);
    assert_eq!(portal.untracked_history_list.len(), 1);
    assert_eq!(portal.untracked_history_list[0].status, GameStatus::Completed);
    assert_eq!(
        portal.untracked_history_list[0].last_played_date,
        Some(1_710_028_800_000)
    );
}

#[tokio::test]
async fn importing_the_same_file_twice_skips_every_game() {
    let source = library();
    let original = seed(&source).await;
    let csv = source.backup.export_csv().await.unwrap();

    let target = library();
    let first = target.backup.import_csv(&csv).await.unwrap();
    assert_eq!(first.games_created, original);

    let second = target.backup.import_csv(&csv).await.unwrap();
    assert_eq!(second.games_created, 0);
    assert_eq!(second.games_skipped, original);
    assert_eq!(second.platforms_created, 0);
    assert_eq!(second.tags_created, 0);
    assert_eq!(target.games.list().await.unwrap().len(), original);
}

#[tokio::test]
async fn game_names_match_case_insensitively_within_a_batch() {
    let lib = library();
    let report = lib
        .backup
        .import_csv("Name,Rating\nHalo,8\n  HALO ,7\nhalo,6\n")
        .await
        .unwrap();

    assert_eq!(report.games_created, 1);
    assert_eq!(report.games_skipped, 2);
}

#[tokio::test]
async fn blank_platform_column_stops_the_scan() {
    let lib = library();
    let csv = "Name,Platform1,Ownership1,Status1,LastPlayed1,Platform2,Ownership2,Status2,LastPlayed2\n\
               Celeste,,,,,Switch,owned,completed,2024-03-10\n";

    let report = lib.backup.import_csv(csv).await.unwrap();
    assert_eq!(report.games_created, 1);
    assert_eq!(report.platforms_created, 0);

    let celeste = &lib.games.list().await.unwrap()[0];
    assert!(celeste.platform_id_list.is_empty());
    assert!(celeste.untracked_history_list.is_empty());
    assert!(lib.platforms.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn existing_platforms_are_reused_by_name() {
    let lib = library();
    let existing = lib
        .platforms
        .save(Platform {
            meta: DocumentMeta::default(),
            name: "Nintendo Switch".into(),
            notes: None,
        })
        .await
        .unwrap();

    let report = lib
        .backup
        .import_csv("Name,Platform1\nCeleste,nintendo switch\nHades,NINTENDO SWITCH\n")
        .await
        .unwrap();
    assert_eq!(report.platforms_created, 0);
    assert_eq!(report.platforms_skipped, 2);

    for game in lib.games.list().await.unwrap() {
        assert_eq!(game.platform_id_list, vec![existing.meta.id.clone().unwrap()]);
    }
}
