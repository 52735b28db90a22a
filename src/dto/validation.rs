//! Validation rules applied to entities before they reach the store.

use validator::{Validate, ValidationError, ValidationErrors};

use crate::dao::models::{Game, Platform, Review, Tag};

/// Rejects names that are empty once trimmed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_required");
        err.message = Some("name is required".into());
        return Err(err);
    }
    Ok(())
}

/// Game ratings go from 0 to 10 in steps of 0.5.
pub fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if !(0.0..=10.0).contains(&rating) || (rating * 2.0).fract() != 0.0 {
        let mut err = ValidationError::new("rating_range");
        err.message = Some(format!("rating must be between 0 and 10 in steps of 0.5 (got {rating})").into());
        return Err(err);
    }
    Ok(())
}

/// Review scores go from 0 to 10.
pub fn validate_score(score: f64) -> Result<(), ValidationError> {
    if !(0.0..=10.0).contains(&score) {
        let mut err = ValidationError::new("score_range");
        err.message = Some(format!("score must be between 0 and 10 (got {score})").into());
        return Err(err);
    }
    Ok(())
}

/// Accepts `#rgb` and `#rrggbb` colors.
///
/// # Examples
///
/// ```ignore
/// validate_hex_color("#444444") // Ok
/// validate_hex_color("#fff")    // Ok
/// validate_hex_color("444444")  // Err - missing hash
/// ```
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let valid = color
        .strip_prefix('#')
        .filter(|digits| matches!(digits.len(), 3 | 6))
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()));

    if !valid {
        let mut err = ValidationError::new("color_format");
        err.message = Some(format!("color must be a #rgb or #rrggbb hex string (got `{color}`)").into());
        return Err(err);
    }
    Ok(())
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Validate for Game {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_name(&self.name) {
            errors.add("name", e);
        }
        if let Some(rating) = self.rating {
            if let Err(e) = validate_rating(rating) {
                errors.add("rating", e);
            }
        }

        into_result(errors)
    }
}

impl Validate for Platform {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_name(&self.name) {
            errors.add("name", e);
        }
        into_result(errors)
    }
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_name(&self.name) {
            errors.add("name", e);
        }
        if let Err(e) = validate_hex_color(&self.color) {
            errors.add("color", e);
        }
        into_result(errors)
    }
}

impl Validate for Review {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.game_id.trim().is_empty() {
            let mut err = ValidationError::new("game_id_required");
            err.message = Some("review must reference a game".into());
            errors.add("gameId", err);
        }

        let metrics = [
            ("difficulty", self.metrics.difficulty),
            ("nostalgia", self.metrics.nostalgia),
        ];
        for (field, score) in self.aspect_ratings.entries().into_iter().chain(metrics) {
            if let Some(score) = score {
                if let Err(e) = validate_score(score) {
                    errors.add(field, e);
                }
            }
        }

        into_result(errors)
    }
}
