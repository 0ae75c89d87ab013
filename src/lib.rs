use std::time::Instant;

use tracing::info;

pub mod error;
pub mod filter;
pub mod io;
pub mod matrix;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod stats;
pub mod types;
pub mod utils;

use error::Result;
use filter::{FilterConfig, FilteredDataset};
use matrix::RatingMatrix;
use recommend::{RecommendConfig, Recommendations};
use similarity::SimilarityMatrix;
use types::RatingEvent;

/// Everything computed for a single recommendation request. All parts are plain data for
/// reporting.
pub struct RecommendationRun {
    pub dataset: FilteredDataset,
    pub ratings: RatingMatrix,
    pub similarities: SimilarityMatrix,
    pub recommendations: Recommendations,
}

/// Filters the raw rating events, builds the rating and similarity matrices and recommends
/// items to `user_id`. Nothing is reused between calls.
pub fn recommend_for(
    events: &[RatingEvent],
    user_id: u32,
    filter_config: &FilterConfig,
    recommend_config: &RecommendConfig,
) -> Result<RecommendationRun> {

    let start = Instant::now();

    let dataset = filter::filter(events, filter_config)?;
    info!("Kept {} of {} rating events after filtering", dataset.len(), events.len());

    let ratings = RatingMatrix::from(&dataset);
    info!("Built rating matrix with {} users and {} items",
        ratings.num_users(), ratings.num_items());

    let similarities = similarity::compute_similarity(&ratings);

    let recommendations = recommend::recommend(
        user_id,
        &similarities,
        &ratings,
        recommend_config.num_neighbors,
        recommend_config.num_recommendations,
    )?;

    info!("Computed {} recommendations for user {} in {}ms",
        recommendations.len(), user_id, utils::millis_since(start));

    Ok(RecommendationRun { dataset, ratings, similarities, recommendations })
}
