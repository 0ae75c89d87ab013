/**
 * Neighborly
 * Copyright (C) 2018 The Neighborly developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::time::Instant;

use tracing::debug;

use crate::matrix::RatingMatrix;
use crate::scoring::{self, ScoredItem};
use crate::types::{self, DenseMatrix, SparseVector};
use crate::utils;

/// Symmetric user x user cosine similarities, indexed like the user axis of the
/// `RatingMatrix` it was computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMatrix {
    similarities: DenseMatrix,
}

impl SimilarityMatrix {

    pub fn num_users(&self) -> usize {
        self.similarities.len()
    }

    pub fn similarity(&self, user_idx: usize, other_user_idx: usize) -> f64 {
        self.similarities[user_idx][other_user_idx]
    }

    pub fn row(&self, user_idx: usize) -> &[f64] {
        &self.similarities[user_idx]
    }

    /// The `k` users most similar to `user_idx`, most similar first. The user itself is never
    /// part of its own neighborhood and `k` is capped at the number of other users.
    pub fn nearest_neighbors(&self, user_idx: usize, k: usize) -> Vec<ScoredItem> {
        let others = self.row(user_idx).iter()
            .enumerate()
            .filter(|&(other_user_idx, _)| other_user_idx != user_idx)
            .map(|(other_user_idx, similarity)| {
                ScoredItem { item: other_user_idx as u32, score: *similarity }
            });

        let k = k.min(self.num_users().saturating_sub(1));

        scoring::top_k(others, k)
    }
}

/// Cosine similarity between all pairs of rows of the rating matrix. Only non-zero cells
/// contribute to the dot products, so we accumulate them per item column over the users that
/// rated it. Rows without any rating have similarity 0 to every other row.
pub fn compute_similarity(matrix: &RatingMatrix) -> SimilarityMatrix {

    let start = Instant::now();

    let num_users = matrix.num_users();

    let rows: Vec<SparseVector> = (0..num_users)
        .map(|user_idx| matrix.sparse_row(user_idx))
        .collect();

    let norms: Vec<f64> = rows.iter()
        .map(|row| row.iter().map(|(_, value)| value * value).sum::<f64>().sqrt())
        .collect();

    let mut columns: Vec<SparseVector> = vec![Vec::new(); matrix.num_items()];
    for (user_idx, row) in rows.iter().enumerate() {
        for &(item_idx, value) in row.iter() {
            columns[item_idx as usize].push((user_idx as u32, value));
        }
    }

    // Upper triangle only, users in a column are in ascending order
    let mut dots = types::new_dense_matrix(num_users, num_users);
    for column in columns.iter() {
        for (position, &(user_a, value_a)) in column.iter().enumerate() {
            for &(user_b, value_b) in column[position + 1..].iter() {
                dots[user_a as usize][user_b as usize] += value_a * value_b;
            }
        }
    }

    let mut similarities = types::new_dense_matrix(num_users, num_users);
    for user_a in 0..num_users {
        similarities[user_a][user_a] = 1.0;

        for user_b in (user_a + 1)..num_users {
            let norm_product = norms[user_a] * norms[user_b];

            let similarity = if norm_product == 0.0 {
                0.0
            } else {
                (dots[user_a][user_b] / norm_product).max(-1.0).min(1.0)
            };

            similarities[user_a][user_b] = similarity;
            similarities[user_b][user_a] = similarity;
        }
    }

    debug!("Computed similarities between {} users in {}ms",
        num_users, utils::millis_since(start));

    SimilarityMatrix { similarities }
}

#[cfg(test)]
mod tests {

    use rand::{Rng, XorShiftRng};

    use crate::matrix::RatingMatrix;
    use crate::similarity;
    use crate::types::RatingEvent;

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-9
    }

    fn dense_cosine(row_a: &[f64], row_b: &[f64]) -> f64 {
        let dot: f64 = row_a.iter().zip(row_b.iter()).map(|(a, b)| a * b).sum();
        let norm_a = row_a.iter().map(|a| a * a).sum::<f64>().sqrt();
        let norm_b = row_b.iter().map(|b| b * b).sum::<f64>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a * norm_b) }
    }

    #[test]
    fn cosine() {
        let matrix = RatingMatrix::build(&[
            RatingEvent::new(1, "w", 5.0, 0),
            RatingEvent::new(1, "x", 3.0, 0),
            RatingEvent::new(2, "w", 4.0, 0),
            RatingEvent::new(2, "x", 5.0, 0),
            RatingEvent::new(2, "y", 2.0, 0),
            RatingEvent::new(3, "y", 5.0, 0),
            RatingEvent::new(3, "z", 4.0, 0),
        ]);

        let similarities = similarity::compute_similarity(&matrix);

        // (5*4 + 3*5) / (sqrt(34) * sqrt(45))
        let expected = 35.0 / (34.0_f64.sqrt() * 45.0_f64.sqrt());
        assert!(close_enough_to(similarities.similarity(0, 1), expected));
        assert!(close_enough_to(similarities.similarity(0, 2), 0.0));

        let expected = 10.0 / (45.0_f64.sqrt() * 41.0_f64.sqrt());
        assert!(close_enough_to(similarities.similarity(1, 2), expected));
    }

    #[test]
    fn symmetric_and_bounded_on_random_ratings() {
        let mut rng = XorShiftRng::new_unseeded();

        let mut events = Vec::new();
        for user in 0..30_u32 {
            for item in 0..25 {
                if rng.gen_range(0, 3) == 0 {
                    let rating = rng.gen_range(1, 11) as f64 / 2.0;
                    events.push(RatingEvent::new(user, &format!("item_{}", item), rating, 0));
                }
            }
        }

        let matrix = RatingMatrix::build(&events);
        let similarities = similarity::compute_similarity(&matrix);

        assert_eq!(similarities.num_users(), matrix.num_users());

        for user_a in 0..matrix.num_users() {
            assert!(close_enough_to(similarities.similarity(user_a, user_a), 1.0));

            for user_b in 0..matrix.num_users() {
                let similarity = similarities.similarity(user_a, user_b);

                assert!(similarity >= -1.0 && similarity <= 1.0);
                assert!(close_enough_to(similarity, similarities.similarity(user_b, user_a)));

                if user_a != user_b {
                    let expected = dense_cosine(matrix.row(user_a), matrix.row(user_b));
                    assert!(close_enough_to(similarity, expected));
                }
            }
        }
    }

    #[test]
    fn nearest_neighbors_exclude_self() {
        let matrix = RatingMatrix::build(&[
            RatingEvent::new(1, "w", 5.0, 0),
            RatingEvent::new(2, "w", 5.0, 0),
            RatingEvent::new(3, "w", 1.0, 0),
            RatingEvent::new(3, "x", 5.0, 0),
            RatingEvent::new(4, "x", 5.0, 0),
        ]);

        let similarities = similarity::compute_similarity(&matrix);

        let neighbors = similarities.nearest_neighbors(0, 2);
        let indices: Vec<u32> = neighbors.iter().map(|neighbor| neighbor.item).collect();
        assert_eq!(indices, vec![1, 2]);

        // k is capped at the number of other users
        let neighbors = similarities.nearest_neighbors(0, 20);
        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.iter().all(|neighbor| neighbor.item != 0));
    }

    #[test]
    fn rows_without_signal() {
        // User 1 only ever gave zero ratings, so its row has a zero norm
        let matrix = RatingMatrix::build(&[
            RatingEvent::new(1, "w", 0.0, 0),
            RatingEvent::new(2, "w", 4.0, 0),
            RatingEvent::new(2, "x", 2.0, 0),
            RatingEvent::new(3, "x", 5.0, 0),
        ]);

        assert!(matrix.sparse_row(0).is_empty());

        let similarities = similarity::compute_similarity(&matrix);

        assert_eq!(similarities.similarity(0, 0), 1.0);
        for other in 1..matrix.num_users() {
            assert_eq!(similarities.similarity(0, other), 0.0);
            assert_eq!(similarities.similarity(other, 0), 0.0);
        }

        for user_a in 0..matrix.num_users() {
            assert!(similarities.row(user_a).iter().all(|similarity| !similarity.is_nan()));
        }

        assert!(similarities.similarity(1, 2) > 0.0);
    }

    #[test]
    fn empty_matrix() {
        let similarities = similarity::compute_similarity(&RatingMatrix::build(&[]));

        assert_eq!(similarities.num_users(), 0);
    }
}
