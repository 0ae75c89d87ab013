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

use std::cmp::Ordering;
use std::ops::Deref;

use fnv::{FnvHashMap, FnvHashSet};
use tracing::debug;

use crate::error::{RecommendError, Result};
use crate::stats::InteractionCounts;
use crate::types::RatingEvent;

/// Thresholds and cohort sizes for reducing raw rating events.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterConfig {
    /// Minimum number of events a user needs over the whole input.
    pub min_user_ratings: u64,
    /// Minimum number of events an item needs over the whole input.
    pub min_item_ratings: u64,
    /// Number of most active users and most popular items to keep.
    pub top_n: usize,
    /// User kept in the user cohort regardless of its activity rank.
    pub always_included_user: Option<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            min_user_ratings: 30,
            min_item_ratings: 30,
            top_n: 2000,
            always_included_user: Some(1),
        }
    }
}

/// Rating events with at most one record per (user, item) pair, most recent first.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredDataset {
    events: Vec<RatingEvent>,
}

impl FilteredDataset {

    pub fn events(&self) -> &[RatingEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<RatingEvent> {
        self.events
    }
}

impl Deref for FilteredDataset {
    type Target = [RatingEvent];

    fn deref(&self) -> &[RatingEvent] {
        &self.events
    }
}

/// Reduces raw rating events to the active users and popular items, with one averaged record
/// per (user, item) pair.
pub fn filter(events: &[RatingEvent], config: &FilterConfig) -> Result<FilteredDataset> {

    if config.top_n == 0 {
        return Err(RecommendError::InvalidParameter("top_n must be positive".to_string()));
    }

    if events.is_empty() {
        return Err(RecommendError::EmptyResult);
    }

    let counts = InteractionCounts::count(events);

    let active_users = counts.users_with_at_least(config.min_user_ratings);
    if active_users.is_empty() {
        return Err(RecommendError::InvalidParameter(format!(
            "no user has at least {} ratings", config.min_user_ratings)));
    }

    let popular_items = counts.items_with_at_least(config.min_item_ratings);
    if popular_items.is_empty() {
        return Err(RecommendError::InvalidParameter(format!(
            "no item has at least {} ratings", config.min_item_ratings)));
    }

    debug!("{} active users and {} popular items among {} events",
        active_users.len(), popular_items.len(), counts.num_interactions());

    let eligible = events.iter()
        .filter(|event| {
            active_users.contains(&event.user_id) &&
                popular_items.contains(event.item_title.as_str())
        });

    let mut aggregated = aggregate(eligible);

    aggregated.sort_by(by_recency);

    let mut seen: FnvHashSet<(u32, String)> =
        FnvHashSet::with_capacity_and_hasher(aggregated.len(), Default::default());
    aggregated.retain(|event| seen.insert((event.user_id, event.item_title.clone())));

    // Cohorts are ranked on the unfiltered input
    let mut top_users: FnvHashSet<u32> = counts.top_users(config.top_n).into_iter().collect();
    if let Some(user) = config.always_included_user {
        top_users.insert(user);
    }
    let top_items: FnvHashSet<&str> = counts.top_items(config.top_n).into_iter().collect();

    aggregated.retain(|event| {
        top_users.contains(&event.user_id) && top_items.contains(event.item_title.as_str())
    });

    if aggregated.is_empty() {
        return Err(RecommendError::EmptyResult);
    }

    debug!("{} rating events left after filtering", aggregated.len());

    Ok(FilteredDataset { events: aggregated })
}

/// Builds a dataset from events that already hold one record per (user, item) pair, keeping
/// the most recent record of any duplicated pair.
pub fn deduplicated(mut events: Vec<RatingEvent>) -> FilteredDataset {
    events.sort_by(by_recency);

    let mut seen: FnvHashSet<(u32, String)> =
        FnvHashSet::with_capacity_and_hasher(events.len(), Default::default());
    events.retain(|event| seen.insert((event.user_id, event.item_title.clone())));

    FilteredDataset { events }
}

/// Mean rating and latest timestamp per (user, item) pair.
fn aggregate<'a, I>(events: I) -> Vec<RatingEvent> where I: Iterator<Item=&'a RatingEvent> {

    let mut groups: FnvHashMap<(u32, &str), (f64, u32, i64)> =
        FnvHashMap::with_capacity_and_hasher(100, Default::default());

    for event in events {
        let group = groups.entry((event.user_id, event.item_title.as_str()))
            .or_insert((0.0, 0, i64::min_value()));

        group.0 += event.rating;
        group.1 += 1;
        group.2 = group.2.max(event.timestamp);
    }

    groups.into_iter()
        .map(|((user_id, item_title), (sum, count, timestamp))| {
            RatingEvent::new(user_id, item_title, sum / count as f64, timestamp)
        })
        .collect()
}

/// Latest first, then by user and title so that the order does not depend on hashing.
fn by_recency(event_a: &RatingEvent, event_b: &RatingEvent) -> Ordering {
    event_b.timestamp.cmp(&event_a.timestamp)
        .then_with(|| event_a.user_id.cmp(&event_b.user_id))
        .then_with(|| event_a.item_title.cmp(&event_b.item_title))
}
