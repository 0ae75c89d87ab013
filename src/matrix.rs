use fnv::{FnvHashMap, FnvHashSet};

use crate::filter::FilteredDataset;
use crate::types::{self, DenseMatrix, DenseVector, RatingEvent, SparseBinaryMatrix, SparseVector};

/// Dense user x item ratings. Rows are ordered by ascending user id, columns by title. Cells
/// without a rating hold 0.0, the set of actually rated cells is tracked separately.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingMatrix {
    user_ids: Vec<u32>,
    item_titles: Vec<String>,
    user_indices: FnvHashMap<u32, usize>,
    item_indices: FnvHashMap<String, usize>,
    ratings: DenseMatrix,
    rated: SparseBinaryMatrix,
}

impl RatingMatrix {

    /// Pivots rating events into a matrix. Expects one event per (user, item) pair; should a
    /// pair occur more than once, its first event wins.
    pub fn build(events: &[RatingEvent]) -> Self {

        let mut user_ids: Vec<u32> = events.iter().map(|event| event.user_id).collect();
        user_ids.sort();
        user_ids.dedup();

        let mut item_titles: Vec<String> = events.iter()
            .map(|event| event.item_title.clone())
            .collect();
        item_titles.sort();
        item_titles.dedup();

        let user_indices: FnvHashMap<u32, usize> = user_ids.iter()
            .enumerate()
            .map(|(index, user)| (*user, index))
            .collect();

        let item_indices: FnvHashMap<String, usize> = item_titles.iter()
            .enumerate()
            .map(|(index, title)| (title.clone(), index))
            .collect();

        let mut ratings = types::new_dense_matrix(user_ids.len(), item_titles.len());
        let mut rated = types::new_sparse_binary_matrix(user_ids.len());

        for event in events {
            let user_idx = user_indices[&event.user_id];
            let item_idx = item_indices[&event.item_title];

            if rated[user_idx].insert(item_idx as u32) {
                ratings[user_idx][item_idx] = event.rating;
            }
        }

        RatingMatrix { user_ids, item_titles, user_indices, item_indices, ratings, rated }
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_titles.len()
    }

    pub fn user_ids(&self) -> &[u32] {
        &self.user_ids
    }

    pub fn item_titles(&self) -> &[String] {
        &self.item_titles
    }

    pub fn user_id(&self, user_idx: usize) -> u32 {
        self.user_ids[user_idx]
    }

    pub fn item_title(&self, item_idx: usize) -> &str {
        &self.item_titles[item_idx]
    }

    pub fn user_index(&self, user_id: u32) -> Option<usize> {
        self.user_indices.get(&user_id).cloned()
    }

    pub fn item_index(&self, item_title: &str) -> Option<usize> {
        self.item_indices.get(item_title).cloned()
    }

    pub fn row(&self, user_idx: usize) -> &[f64] {
        &self.ratings[user_idx]
    }

    pub fn rating(&self, user_idx: usize, item_idx: usize) -> f64 {
        self.ratings[user_idx][item_idx]
    }

    /// Whether the user actually rated the item, as opposed to a zero-filled cell.
    pub fn has_rated(&self, user_idx: usize, item_idx: usize) -> bool {
        self.rated[user_idx].contains(&(item_idx as u32))
    }

    pub fn rated_items(&self, user_idx: usize) -> &FnvHashSet<u32> {
        &self.rated[user_idx]
    }

    /// Non-zero cells of a row.
    pub fn sparse_row(&self, user_idx: usize) -> SparseVector {
        self.ratings[user_idx].iter()
            .enumerate()
            .filter(|&(_, rating)| *rating != 0.0)
            .map(|(item_idx, rating)| (item_idx as u32, *rating))
            .collect()
    }

    /// Per item mean over the given rows, zero-filled cells included.
    pub fn column_means(&self, user_indices: &[usize]) -> DenseVector {
        let mut means = vec![0.0; self.num_items()];

        if user_indices.is_empty() {
            return means;
        }

        for user_idx in user_indices {
            for (mean, rating) in means.iter_mut().zip(self.ratings[*user_idx].iter()) {
                *mean += *rating;
            }
        }

        let num_rows = user_indices.len() as f64;
        for mean in means.iter_mut() {
            *mean /= num_rows;
        }

        means
    }

    /// Per item mean over all rows, zero-filled cells included.
    pub fn global_column_means(&self) -> DenseVector {
        let all_users: Vec<usize> = (0..self.num_users()).collect();
        self.column_means(&all_users)
    }
}

impl<'a> From<&'a FilteredDataset> for RatingMatrix {

    fn from(dataset: &'a FilteredDataset) -> Self {
        RatingMatrix::build(dataset.events())
    }
}

#[cfg(test)]
mod tests {

    use std::f64::EPSILON;

    use crate::filter;
    use crate::matrix::RatingMatrix;
    use crate::types::RatingEvent;

    fn within_epsilon(value: f64, expected: f64) -> bool {
        (value - expected).abs() < EPSILON
    }

    fn events() -> Vec<RatingEvent> {
        vec![
            RatingEvent::new(7, "Casablanca", 4.0, 1),
            RatingEvent::new(3, "Alien", 5.0, 2),
            RatingEvent::new(3, "Brazil", 3.0, 3),
            RatingEvent::new(7, "Alien", 1.5, 4),
        ]
    }

    #[test]
    fn pivot_with_zero_fill() {
        let matrix = RatingMatrix::build(&events());

        assert_eq!(matrix.user_ids(), &[3, 7]);
        assert_eq!(matrix.item_titles(), &["Alien", "Brazil", "Casablanca"]);

        assert_eq!(matrix.row(0), &[5.0, 3.0, 0.0]);
        assert_eq!(matrix.row(1), &[1.5, 0.0, 4.0]);

        assert_eq!(matrix.user_index(7), Some(1));
        assert_eq!(matrix.user_index(8), None);
        assert_eq!(matrix.item_index("Brazil"), Some(1));

        assert!(matrix.has_rated(1, 2));
        assert!(!matrix.has_rated(1, 1));
        assert_eq!(matrix.sparse_row(1), vec![(0, 1.5), (2, 4.0)]);
    }

    #[test]
    fn deterministic() {
        let dataset = filter::deduplicated(events());

        let first = RatingMatrix::from(&dataset);

        let mut reversed = dataset.into_events();
        reversed.reverse();
        let second = RatingMatrix::build(&reversed);

        assert_eq!(first.user_ids(), second.user_ids());
        assert_eq!(first.item_titles(), second.item_titles());
        for user_idx in 0..first.num_users() {
            assert_eq!(first.row(user_idx), second.row(user_idx));
        }
    }

    #[test]
    fn means_include_zero_fill() {
        let matrix = RatingMatrix::build(&events());

        let means = matrix.global_column_means();
        assert!(within_epsilon(means[0], 3.25));
        assert!(within_epsilon(means[1], 1.5));
        assert!(within_epsilon(means[2], 2.0));

        let means = matrix.column_means(&[1]);
        assert!(within_epsilon(means[1], 0.0));

        assert_eq!(matrix.column_means(&[]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty() {
        let matrix = RatingMatrix::build(&[]);

        assert_eq!(matrix.num_users(), 0);
        assert_eq!(matrix.num_items(), 0);
        assert!(matrix.global_column_means().is_empty());
    }
}
