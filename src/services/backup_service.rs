//! CSV backup of the game library.
//!
//! Export writes one row per game with a repeated `Platform{i}`, `Ownership{i}`,
//! `Status{i}`, `LastPlayed{i}` column group. Import merges rows into the
//! library: games, platforms and tags are matched by case-insensitive name and
//! never duplicated.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use time::Date;
use tracing::{info, warn};

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{
            Game, GameStatus, OwnershipEntry, OwnershipType, PlaySession, Platform, Tag,
            UntrackedHistoryEntry,
        },
        repository::Repository,
    },
    dto::{backup::ImportReport, validation::validate_rating},
    error::ServiceError,
    services::{
        csv_codec::{CsvRow, parse_csv, write_csv},
        dates::{format_iso_date, parse_iso_date},
        game_service::GameService,
        platform_service::PlatformService,
        playtime,
        tag_service::TagService,
    },
};

/// MIME type of exported backups.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const MS_PER_HOUR: f64 = 3_600_000.0;

const BASE_HEADERS: [&str; 6] = [
    "Name",
    "Rating",
    "ReleaseDate",
    "IsRetroGame",
    "Tags",
    "TotalPlaytimeHours",
];

/// `playloop-backup-YYYY-MM-DD.csv`
pub fn backup_file_name(date: Date) -> String {
    format!("playloop-backup-{date}.csv")
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn cell<'a>(row: &'a CsvRow, header: &str) -> &'a str {
    row.get(header).map(String::as_str).unwrap_or_default()
}

fn format_hours(playtime_ms: i64) -> String {
    if playtime_ms > 0 {
        format!("{:.2}", playtime_ms as f64 / MS_PER_HOUR)
    } else {
        String::new()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "yes" | "true" | "1")
}

fn row_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Validation(message)
        | ServiceError::MalformedInput(message)
        | ServiceError::NotFound(message) => message.clone(),
        ServiceError::Storage(source) => source.to_string(),
        ServiceError::Csv(source) => source.to_string(),
    }
}

/// Platforms listed for a game: ownership entries when present, else the flat id list.
fn owned_platforms(game: &Game) -> Vec<(String, OwnershipType)> {
    if game.ownership_list.is_empty() {
        game.platform_id_list
            .iter()
            .map(|id| (id.clone(), OwnershipType::Owned))
            .collect()
    } else {
        game.ownership_list
            .iter()
            .map(|entry| (entry.platform_id.clone(), entry.ownership_type))
            .collect()
    }
}

/// Names known before and during one import run, keyed by lowercase trimmed name.
struct ImportBatch {
    game_names: HashSet<String>,
    platforms: HashMap<String, String>,
    tags: HashMap<String, String>,
    report: ImportReport,
}

/// Export and import of the library as CSV.
#[derive(Clone)]
pub struct BackupService {
    games: GameService,
    platforms: PlatformService,
    tags: TagService,
    sessions: Repository<PlaySession>,
}

impl BackupService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            games: GameService::new(store.clone()),
            platforms: PlatformService::new(store.clone()),
            tags: TagService::new(store.clone()),
            sessions: Repository::new(store),
        }
    }

    /// Serialize every game, sorted by name. An empty library gives an empty string.
    pub async fn export_csv(&self) -> Result<String, ServiceError> {
        let games = self.games.list().await?;
        let platform_names: HashMap<String, String> = self
            .platforms
            .list()
            .await?
            .into_iter()
            .filter_map(|p| Some((p.meta.id?, p.name)))
            .collect();
        let tag_names: HashMap<String, String> = self
            .tags
            .list()
            .await?
            .into_iter()
            .filter_map(|t| Some((t.meta.id?, t.name)))
            .collect();

        let sessions = self.sessions.list().await?;
        let mut sessions_by_game: HashMap<&str, Vec<&PlaySession>> = HashMap::new();
        for session in &sessions {
            if let Some(gaming_session) = &session.gaming_session {
                sessions_by_game
                    .entry(gaming_session.game_id.as_str())
                    .or_default()
                    .push(session);
            }
        }

        let max_platforms = games
            .iter()
            .map(|g| g.ownership_list.len().max(g.platform_id_list.len()))
            .max()
            .unwrap_or(0);

        let mut headers: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
        for i in 1..=max_platforms {
            headers.extend([
                format!("Platform{i}"),
                format!("Ownership{i}"),
                format!("Status{i}"),
                format!("LastPlayed{i}"),
            ]);
        }

        let mut rows: Vec<(String, CsvRow)> = games
            .iter()
            .map(|game| {
                let game_sessions = game
                    .meta
                    .id
                    .as_deref()
                    .and_then(|id| sessions_by_game.get(id))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let total = playtime::total_playtime(
                    Some(game),
                    game_sessions.iter().copied(),
                    false,
                );

                let row = export_row(game, total, &platform_names, &tag_names);
                (name_key(&game.name), row)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let rows: Vec<CsvRow> = rows.into_iter().map(|(_, row)| row).collect();
        info!(games = rows.len(), columns = headers.len(), "library exported");
        Ok(write_csv(&headers, &rows)?)
    }

    /// Merge CSV rows into the library. Row failures are reported, never fatal.
    pub async fn import_csv(&self, text: &str) -> Result<ImportReport, ServiceError> {
        let rows = parse_csv(text);
        if rows.is_empty() {
            return Err(ServiceError::MalformedInput(
                "CSV file is empty or invalid".into(),
            ));
        }

        let mut batch = self.snapshot().await?;

        for (index, row) in rows.iter().enumerate() {
            if let Err(err) = self.import_row(&mut batch, row).await {
                let message = format!("Row {}: {}", index + 2, row_message(&err));
                warn!(error = %err, row = index + 2, "CSV row import failed");
                batch.report.errors.push(message);
            }
        }

        let report = batch.report;
        info!(
            games_created = report.games_created,
            games_skipped = report.games_skipped,
            platforms_created = report.platforms_created,
            tags_created = report.tags_created,
            errors = report.errors.len(),
            "CSV import finished"
        );
        Ok(report)
    }

    async fn snapshot(&self) -> Result<ImportBatch, ServiceError> {
        let game_names = self
            .games
            .list()
            .await?
            .iter()
            .map(|game| name_key(&game.name))
            .collect();

        let mut platforms = HashMap::new();
        for platform in self.platforms.list().await? {
            if let Some(id) = platform.meta.id {
                platforms.entry(name_key(&platform.name)).or_insert(id);
            }
        }

        let mut tags = HashMap::new();
        for tag in self.tags.list().await? {
            if let Some(id) = tag.meta.id {
                tags.entry(name_key(&tag.name)).or_insert(id);
            }
        }

        Ok(ImportBatch {
            game_names,
            platforms,
            tags,
            report: ImportReport::default(),
        })
    }

    async fn import_row(&self, batch: &mut ImportBatch, row: &CsvRow) -> Result<(), ServiceError> {
        let name = cell(row, "Name");
        if name.is_empty() {
            return Err(ServiceError::Validation("Game name is required".into()));
        }
        if batch.game_names.contains(&name_key(name)) {
            batch.report.games_skipped += 1;
            return Ok(());
        }

        let mut tag_id_list: Vec<String> = Vec::new();
        for tag_name in cell(row, "Tags").split(',').map(str::trim) {
            if tag_name.is_empty() {
                continue;
            }
            let id = self.resolve_tag(batch, tag_name).await?;
            if !tag_id_list.contains(&id) {
                tag_id_list.push(id);
            }
        }

        let rating = cell(row, "Rating")
            .parse::<f64>()
            .ok()
            .filter(|rating| validate_rating(*rating).is_ok());
        let untracked_playtime = cell(row, "TotalPlaytimeHours")
            .parse::<f64>()
            .ok()
            .filter(|hours| *hours > 0.0)
            .map(|hours| (hours * MS_PER_HOUR).round() as i64);

        let mut game = Game {
            name: name.to_string(),
            tag_id_list,
            rating,
            release_date: parse_iso_date(cell(row, "ReleaseDate")),
            is_retro_game: parse_flag(cell(row, "IsRetroGame")),
            untracked_playtime,
            ..Default::default()
        };

        // The scan stops at the first blank platform cell.
        for i in 1.. {
            let platform_name = cell(row, &format!("Platform{i}"));
            if platform_name.is_empty() {
                break;
            }
            let platform_id = self.resolve_platform(batch, platform_name).await?;

            let ownership_type =
                OwnershipType::parse(cell(row, &format!("Ownership{i}"))).unwrap_or_default();
            let status = cell(row, &format!("Status{i}"));
            if !status.is_empty() {
                game.untracked_history_list.push(UntrackedHistoryEntry {
                    platform_id: platform_id.clone(),
                    status: GameStatus::parse(status).unwrap_or(GameStatus::InProgress),
                    last_played_date: parse_iso_date(cell(row, &format!("LastPlayed{i}"))),
                });
            }

            game.ownership_list.push(OwnershipEntry {
                platform_id: platform_id.clone(),
                ownership_type,
            });
            game.platform_id_list.push(platform_id);
        }

        self.games.save(game).await?;
        batch.game_names.insert(name_key(name));
        batch.report.games_created += 1;
        Ok(())
    }

    async fn resolve_tag(&self, batch: &mut ImportBatch, name: &str) -> Result<String, ServiceError> {
        let key = name_key(name);
        if let Some(id) = batch.tags.get(&key) {
            return Ok(id.clone());
        }

        let tag = self.tags.save(Tag::new(name)).await?;
        let id = tag.meta.id.unwrap_or_default();
        batch.tags.insert(key, id.clone());
        batch.report.tags_created += 1;
        Ok(id)
    }

    async fn resolve_platform(
        &self,
        batch: &mut ImportBatch,
        name: &str,
    ) -> Result<String, ServiceError> {
        let key = name_key(name);
        if let Some(id) = batch.platforms.get(&key) {
            batch.report.platforms_skipped += 1;
            return Ok(id.clone());
        }

        let platform = self
            .platforms
            .save(Platform {
                name: name.to_string(),
                ..Default::default()
            })
            .await?;
        let id = platform.meta.id.unwrap_or_default();
        batch.platforms.insert(key, id.clone());
        batch.report.platforms_created += 1;
        Ok(id)
    }
}

fn export_row(
    game: &Game,
    total_playtime: i64,
    platform_names: &HashMap<String, String>,
    tag_names: &HashMap<String, String>,
) -> CsvRow {
    let mut row = CsvRow::new();

    let tags = game
        .tag_id_list
        .iter()
        .filter_map(|id| tag_names.get(id))
        .map(|name| name.trim())
        .collect::<Vec<_>>()
        .join(", ");

    row.insert("Name".into(), game.name.trim().to_string());
    row.insert(
        "Rating".into(),
        game.rating.map(|r| r.to_string()).unwrap_or_default(),
    );
    row.insert(
        "ReleaseDate".into(),
        game.release_date
            .and_then(format_iso_date)
            .unwrap_or_default(),
    );
    row.insert(
        "IsRetroGame".into(),
        (if game.is_retro_game { "Yes" } else { "No" }).into(),
    );
    row.insert("Tags".into(), tags.trim().to_string());
    row.insert("TotalPlaytimeHours".into(), format_hours(total_playtime));

    for (index, (platform_id, ownership)) in owned_platforms(game).into_iter().enumerate() {
        let i = index + 1;
        let history = game
            .untracked_history_list
            .iter()
            .rfind(|entry| entry.platform_id == platform_id);

        row.insert(
            format!("Platform{i}"),
            platform_names.get(&platform_id).cloned().unwrap_or_default(),
        );
        row.insert(format!("Ownership{i}"), ownership.as_str().into());
        row.insert(
            format!("Status{i}"),
            history.map(|h| h.status.as_str().to_string()).unwrap_or_default(),
        );
        row.insert(
            format!("LastPlayed{i}"),
            history
                .and_then(|h| h.last_played_date)
                .and_then(format_iso_date)
                .unwrap_or_default(),
        );
    }

    row
}
