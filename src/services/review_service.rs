use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{AspectRatings, Review},
        repository::Repository,
    },
    error::ServiceError,
    services::dates::now_ms,
};

/// Game reviews. At most one review per game is expected, callers check before creating.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Repository<Review>,
}

impl ReviewService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            reviews: Repository::new(store),
        }
    }

    /// Every review.
    pub async fn list(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.reviews.list().await?)
    }

    /// Review by id, `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<Review>, ServiceError> {
        Ok(self.reviews.find(id).await?)
    }

    /// First review referencing `game_id`.
    pub async fn review_for_game(&self, game_id: &str) -> Result<Option<Review>, ServiceError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|review| review.game_id == game_id))
    }

    /// Stamps `createdAt` on first save and `updatedAt` on every save.
    pub async fn save(&self, mut review: Review) -> Result<Review, ServiceError> {
        review.validate()?;

        let now = now_ms();
        if review.meta.id.is_none() {
            review.created_at = Some(now);
        }
        review.updated_at = Some(now);

        let saved = self.reviews.save(review).await?;
        info!(id = ?saved.meta.id, game_id = %saved.game_id, "review saved");
        Ok(saved)
    }

    /// Delete a review at its current revision.
    pub async fn delete(&self, review: Review) -> Result<(), ServiceError> {
        Ok(self.reviews.delete(review).await?)
    }
}

/// Mean of the aspect scores that are set.
pub fn average_rating(aspects: &AspectRatings) -> Option<f64> {
    let scores: Vec<f64> = aspects
        .entries()
        .into_iter()
        .filter_map(|(_, score)| score)
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
