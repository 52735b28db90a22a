use std::{collections::HashSet, sync::Arc};

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{DocumentMeta, Platform, Tag},
    },
    error::ServiceError,
    services::{platform_service::PlatformService, tag_service::TagService},
};

const DEFAULT_PLATFORMS: [(&str, &str); 10] = [
    ("PC", "Personal Computer"),
    ("PlayStation 5", "Sony PlayStation 5"),
    ("PlayStation 4", "Sony PlayStation 4"),
    ("Xbox Series X|S", "Microsoft Xbox Series X|S"),
    ("Xbox One", "Microsoft Xbox One"),
    ("Nintendo Switch", "Nintendo Switch"),
    ("Nintendo 3DS", "Nintendo 3DS"),
    ("Steam Deck", "Valve Steam Deck"),
    ("Mobile", "Mobile devices (iOS/Android)"),
    ("Other", "Other platforms"),
];

const DEFAULT_TAGS: [(&str, &str); 4] = [
    ("Nostalgia", "#9C27B0"),
    ("Hidden Gem", "#00BCD4"),
    ("Favorite", "#FF9800"),
    ("Recommended", "#4CAF50"),
];

const PLATFORMS_WEIGHT: u8 = 40;
const TAGS_WEIGHT: u8 = 30;

/// Milestone of the default-data setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SetupProgress {
    /// Step identifier.
    pub step: String,
    /// 0 to 100.
    pub progress: u8,
    /// Human readable description.
    pub message: String,
}

/// Receives setup milestones.
pub trait ProgressSink {
    /// Handle one milestone.
    fn report(&mut self, progress: SetupProgress);
}

impl<F: FnMut(SetupProgress)> ProgressSink for F {
    fn report(&mut self, progress: SetupProgress) {
        self(progress)
    }
}

/// What the seed added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// Platforms added.
    pub platforms_created: usize,
    /// Tags added.
    pub tags_created: usize,
}

fn milestone(step: &str, progress: u8, message: &str) -> SetupProgress {
    SetupProgress {
        step: step.to_string(),
        progress,
        message: message.to_string(),
    }
}

/// First-run library setup.
#[derive(Clone)]
pub struct OnboardingService {
    platforms: PlatformService,
    tags: TagService,
}

impl OnboardingService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            platforms: PlatformService::new(store.clone()),
            tags: TagService::new(store),
        }
    }

    /// Create the default platforms and tags whose names are not taken yet.
    pub async fn seed_defaults(
        &self,
        sink: &mut impl ProgressSink,
    ) -> Result<SeedReport, ServiceError> {
        let mut report = SeedReport::default();

        sink.report(milestone("platforms", 0, "Creating game platforms..."));
        let existing: HashSet<String> = self
            .platforms
            .list()
            .await?
            .iter()
            .map(|p| p.name.trim().to_lowercase())
            .collect();
        for (name, notes) in DEFAULT_PLATFORMS {
            if existing.contains(&name.to_lowercase()) {
                continue;
            }
            self.platforms
                .save(Platform {
                    meta: DocumentMeta::default(),
                    name: name.to_string(),
                    notes: Some(notes.to_string()),
                })
                .await?;
            report.platforms_created += 1;
        }
        sink.report(milestone("platforms", PLATFORMS_WEIGHT, "Game platforms ready"));

        sink.report(milestone("tags", PLATFORMS_WEIGHT, "Creating default tags..."));
        let existing: HashSet<String> = self
            .tags
            .list()
            .await?
            .iter()
            .map(|t| t.name.trim().to_lowercase())
            .collect();
        for (name, color) in DEFAULT_TAGS {
            if existing.contains(&name.to_lowercase()) {
                continue;
            }
            let mut tag = Tag::new(name);
            tag.color = color.to_string();
            self.tags.save(tag).await?;
            report.tags_created += 1;
        }
        let tagged = PLATFORMS_WEIGHT + TAGS_WEIGHT;
        sink.report(milestone("tags", tagged, "Default tags ready"));

        sink.report(milestone("finalize", tagged, "Finalizing setup..."));
        info!(
            platforms_created = report.platforms_created,
            tags_created = report.tags_created,
            "default library data seeded"
        );
        sink.report(milestone("finalize", 100, "Setup complete"));

        Ok(report)
    }
}
