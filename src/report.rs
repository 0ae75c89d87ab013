use serde_derive::Serialize;

use crate::error::{RecommendError, Result};
use crate::filter::FilteredDataset;
use crate::matrix::RatingMatrix;
use crate::recommend::{RecommendationSource, Recommendations};
use crate::similarity::SimilarityMatrix;
use crate::stats::InteractionCounts;

const RATING_BINS: usize = 10;
const COUNT_BINS: usize = 30;

/// Equal width binning of a series of values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
}

impl Histogram {

    pub fn of(values: &[f64], num_bins: usize) -> Self {
        let num_bins = num_bins.max(1);
        let mut counts = vec![0; num_bins];

        if values.is_empty() {
            return Histogram { min: 0.0, max: 0.0, counts };
        }

        let min = values.iter().cloned().fold(std::f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max);
        let width = (max - min) / num_bins as f64;

        for value in values {
            let bin = if width > 0.0 {
                (((value - min) / width) as usize).min(num_bins - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }

        Histogram { min, max, counts }
    }

    pub fn num_values(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Ratings the user gave, in dataset order.
pub fn user_ratings(dataset: &FilteredDataset, user_id: u32) -> Vec<f64> {
    dataset.iter()
        .filter(|event| event.user_id == user_id)
        .map(|event| event.rating)
        .collect()
}

/// Mean rating per item over the user's nearest neighbors, in column order.
pub fn neighbor_mean_ratings(
    similarities: &SimilarityMatrix,
    ratings: &RatingMatrix,
    user_id: u32,
    num_neighbors: usize,
) -> Result<Vec<f64>> {

    let user_idx = ratings.user_index(user_id).ok_or(RecommendError::UnknownUser(user_id))?;

    let neighbors: Vec<usize> = similarities.nearest_neighbors(user_idx, num_neighbors)
        .into_iter()
        .map(|neighbor| neighbor.item as usize)
        .collect();

    Ok(ratings.column_means(&neighbors))
}

/// Number of ratings per user, ordered by user id.
pub fn user_activity(dataset: &FilteredDataset) -> Vec<(u32, u64)> {
    let counts = InteractionCounts::count(dataset.iter());

    let mut activity: Vec<(u32, u64)> = counts.user_counts().iter()
        .map(|(user, count)| (*user, *count))
        .collect();
    activity.sort();

    activity
}

/// Number of ratings per item, ordered by title.
pub fn item_popularity(dataset: &FilteredDataset) -> Vec<(String, u64)> {
    let counts = InteractionCounts::count(dataset.iter());

    let mut popularity: Vec<(String, u64)> = counts.item_counts().iter()
        .map(|(item, count)| (item.clone(), *count))
        .collect();
    popularity.sort();

    popularity
}

/// All series a chart renderer needs for one target user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub user_id: u32,
    pub num_user_ratings: usize,
    pub user_rating_distribution: Histogram,
    pub neighbor_rating_distribution: Histogram,
    pub user_activity_distribution: Histogram,
    pub item_popularity_distribution: Histogram,
    pub recommendation_source: RecommendationSource,
    pub recommendation_scores: Vec<(String, f64)>,
}

impl Report {

    pub fn build(
        dataset: &FilteredDataset,
        ratings: &RatingMatrix,
        similarities: &SimilarityMatrix,
        recommendations: &Recommendations,
        user_id: u32,
        num_neighbors: usize,
    ) -> Result<Self> {

        let own_ratings = user_ratings(dataset, user_id);
        let neighbor_means = neighbor_mean_ratings(similarities, ratings, user_id, num_neighbors)?;

        let activity: Vec<f64> = user_activity(dataset).into_iter()
            .map(|(_, count)| count as f64)
            .collect();

        let popularity: Vec<f64> = item_popularity(dataset).into_iter()
            .map(|(_, count)| count as f64)
            .collect();

        let recommendation_scores = recommendations.items.iter()
            .map(|recommendation| (recommendation.title.clone(), recommendation.score))
            .collect();

        Ok(Report {
            user_id,
            num_user_ratings: own_ratings.len(),
            user_rating_distribution: Histogram::of(&own_ratings, RATING_BINS),
            neighbor_rating_distribution: Histogram::of(&neighbor_means, RATING_BINS),
            user_activity_distribution: Histogram::of(&activity, COUNT_BINS),
            item_popularity_distribution: Histogram::of(&popularity, COUNT_BINS),
            recommendation_source: recommendations.source,
            recommendation_scores,
        })
    }
}
