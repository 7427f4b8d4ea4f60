// src/domain/rating.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::ServerError;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Folds one new rating into a volunteer's running mean.
///
/// `completed_jobs` must already include the job being rated; every earlier
/// completion is assumed to have contributed exactly one rating to `old`.
pub fn fold_rating(old: f64, completed_jobs: i64, new: f64) -> f64 {
    if completed_jobs > 1 {
        let n = completed_jobs as f64;
        (old * (n - 1.0) + new) / n
    } else {
        new
    }
}

pub fn validate_rating(rating: f64) -> Result<f64, ServerError> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ServerError::BadRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(rating)
}

/// One requester review, as listed on a volunteer's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub job_id: i64,
    pub job_title: String,
    pub rating: f64,
    pub review: String,
    pub requester_name: String,
    pub created_at: DateTime<Utc>,
}
