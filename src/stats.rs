use std::cmp::Ordering;

use fnv::{FnvHashMap, FnvHashSet};

use crate::types::RatingEvent;

/// Number of events per user and per item over some collection of rating events.
pub struct InteractionCounts {
    user_counts: FnvHashMap<u32, u64>,
    item_counts: FnvHashMap<String, u64>,
    num_interactions: u64,
}

impl InteractionCounts {

    pub fn num_users(&self) -> usize {
        self.user_counts.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_counts.len()
    }

    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn user_count(&self, user_id: u32) -> u64 {
        self.user_counts.get(&user_id).cloned().unwrap_or(0)
    }

    pub fn item_count(&self, item_title: &str) -> u64 {
        self.item_counts.get(item_title).cloned().unwrap_or(0)
    }

    pub fn user_counts(&self) -> &FnvHashMap<u32, u64> {
        &self.user_counts
    }

    pub fn item_counts(&self) -> &FnvHashMap<String, u64> {
        &self.item_counts
    }

    /// Users with at least `threshold` events.
    pub fn users_with_at_least(&self, threshold: u64) -> FnvHashSet<u32> {
        self.user_counts.iter()
            .filter(|&(_, count)| *count >= threshold)
            .map(|(user, _)| *user)
            .collect()
    }

    /// Items with at least `threshold` events.
    pub fn items_with_at_least(&self, threshold: u64) -> FnvHashSet<&str> {
        self.item_counts.iter()
            .filter(|&(_, count)| *count >= threshold)
            .map(|(item, _)| item.as_str())
            .collect()
    }

    /// The `n` most active users, ties broken by ascending user id.
    pub fn top_users(&self, n: usize) -> Vec<u32> {
        top_by_count(self.user_counts.iter().map(|(user, count)| (*user, *count)), n)
    }

    /// The `n` most rated items, ties broken by ascending title.
    pub fn top_items(&self, n: usize) -> Vec<&str> {
        top_by_count(self.item_counts.iter().map(|(item, count)| (item.as_str(), *count)), n)
    }
}

impl InteractionCounts {

    pub fn count<'a, T>(events: T) -> Self where T: IntoIterator<Item=&'a RatingEvent> {

        let mut user_counts: FnvHashMap<u32, u64> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut item_counts: FnvHashMap<String, u64> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut num_interactions: u64 = 0;

        for event in events {
            *user_counts.entry(event.user_id).or_insert(0) += 1;

            if let Some(count) = item_counts.get_mut(event.item_title.as_str()) {
                *count += 1;
            } else {
                item_counts.insert(event.item_title.clone(), 1);
            }

            num_interactions += 1;
        }

        InteractionCounts { user_counts, item_counts, num_interactions }
    }
}

fn top_by_count<K, I>(counts: I, n: usize) -> Vec<K>
    where K: Ord + Copy, I: Iterator<Item=(K, u64)> {

    let mut sorted: Vec<(K, u64)> = counts.collect();

    sorted.sort_by(|(key_a, count_a), (key_b, count_b)| {
        match count_b.cmp(count_a) {
            Ordering::Equal => key_a.cmp(key_b),
            ordering => ordering,
        }
    });

    sorted.into_iter()
        .take(n)
        .map(|(key, _)| key)
        .collect()
}
