use serde_derive::Serialize;
use tracing::{debug, info};

use crate::error::{RecommendError, Result};
use crate::matrix::RatingMatrix;
use crate::scoring::{self, ScoredItem};
use crate::similarity::SimilarityMatrix;

/// Neighborhood size and list length for a recommendation request.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendConfig {
    pub num_neighbors: usize,
    pub num_recommendations: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        RecommendConfig { num_neighbors: 20, num_recommendations: 5 }
    }
}

/// Where the scores of a recommendation list come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Mean ratings of the target user's nearest neighbors.
    Neighbors,
    /// Mean ratings over all users, used when the neighbors yield nothing.
    GlobalAverage,
    /// The target user already rated every item.
    Exhausted,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub score: f64,
}

/// Unrated items for a user, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendations {
    pub items: Vec<Recommendation>,
    pub source: RecommendationSource,
}

impl Recommendations {

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RecommendationSource::GlobalAverage
    }
}

/// Recommends up to `num_recommendations` items the target user has not rated yet, scored by
/// the mean rating of its `num_neighbors` most similar users. Neighbors that never rated an
/// item count as 0.0 for that item. If no unrated item gets a positive score from the
/// neighborhood, items are ranked by their mean rating over all users instead.
pub fn recommend(
    target_user: u32,
    similarities: &SimilarityMatrix,
    ratings: &RatingMatrix,
    num_neighbors: usize,
    num_recommendations: usize,
) -> Result<Recommendations> {

    if num_neighbors == 0 {
        return Err(RecommendError::InvalidParameter(
            "number of neighbors must be positive".to_string()));
    }

    if num_recommendations == 0 {
        return Err(RecommendError::InvalidParameter(
            "number of recommendations must be positive".to_string()));
    }

    if similarities.num_users() != ratings.num_users() {
        return Err(RecommendError::InvalidParameter(format!(
            "similarity matrix covers {} users, rating matrix {}",
            similarities.num_users(), ratings.num_users())));
    }

    let user_idx = ratings.user_index(target_user)
        .ok_or(RecommendError::UnknownUser(target_user))?;

    let neighbors: Vec<usize> = similarities.nearest_neighbors(user_idx, num_neighbors)
        .into_iter()
        .map(|neighbor| neighbor.item as usize)
        .collect();

    debug!("Found {} neighbors for user {}", neighbors.len(), target_user);

    if !neighbors.is_empty() {
        let neighbor_means = ratings.column_means(&neighbors);

        let candidates: Vec<ScoredItem> = unrated(ratings, user_idx, &neighbor_means).collect();

        // Without a single positive score the neighbors carry no signal at all
        if candidates.iter().any(|candidate| candidate.score > 0.0) {
            let top_items = scoring::top_k(candidates.into_iter(), num_recommendations);

            return Ok(Recommendations {
                items: named(ratings, &top_items),
                source: RecommendationSource::Neighbors,
            });
        }
    }

    info!("No recommendations based on similar users for user {}. Falling back to global \
        average ratings.", target_user);

    let global_means = ratings.global_column_means();
    let top_items = scoring::top_k(unrated(ratings, user_idx, &global_means), num_recommendations);

    if top_items.is_empty() {
        info!("User {} has already rated all {} items, nothing to recommend.",
            target_user, ratings.num_items());

        return Ok(Recommendations { items: Vec::new(), source: RecommendationSource::Exhausted });
    }

    Ok(Recommendations {
        items: named(ratings, &top_items),
        source: RecommendationSource::GlobalAverage,
    })
}

fn unrated<'a>(
    ratings: &'a RatingMatrix,
    user_idx: usize,
    scores: &'a [f64],
) -> impl Iterator<Item=ScoredItem> + 'a {

    scores.iter()
        .enumerate()
        .filter(move |&(item_idx, _)| !ratings.has_rated(user_idx, item_idx))
        .map(|(item_idx, score)| ScoredItem { item: item_idx as u32, score: *score })
}

fn named(ratings: &RatingMatrix, scored_items: &[ScoredItem]) -> Vec<Recommendation> {
    scored_items.iter()
        .map(|scored_item| Recommendation {
            title: ratings.item_title(scored_item.item as usize).to_string(),
            score: scored_item.score,
        })
        .collect()
}
