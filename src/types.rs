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

use fnv::FnvHashSet;
use serde_derive::{Deserialize, Serialize};

/// A single observed rating of an item by a user. Never mutated once read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: u32,
    pub item_title: String,
    pub rating: f64,
    pub timestamp: i64,
}

impl RatingEvent {
    pub fn new(user_id: u32, item_title: &str, rating: f64, timestamp: i64) -> Self {
        RatingEvent { user_id, item_title: item_title.to_string(), rating, timestamp }
    }
}

pub type DenseVector = Vec<f64>;
pub type DenseMatrix = Vec<DenseVector>;

/// Non-zero entries of a row as (column index, value), ordered by column index.
pub type SparseVector = Vec<(u32, f64)>;

pub type SparseBinaryMatrix = Vec<FnvHashSet<u32>>;

pub fn new_dense_matrix(num_rows: usize, num_columns: usize) -> DenseMatrix {
    vec![vec![0.0; num_columns]; num_rows]
}

pub fn new_sparse_binary_matrix(num_rows: usize) -> SparseBinaryMatrix {
    vec![FnvHashSet::with_capacity_and_hasher(0, Default::default()); num_rows]
}
