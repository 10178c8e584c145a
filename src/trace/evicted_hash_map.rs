//! # Evicted Map

use crate::{Key, KeyValue, Value};
use indexmap::IndexMap;

/// A hash map with a capped number of attributes that retains the most
/// recently set entries.
///
/// Setting a key refreshes its recency whether or not it was already
/// present, so under steady re-writes of the same keys the hot set is
/// retained and stale keys are evicted. Every write counts toward the
/// running insertion total, including re-writes of existing keys, so
/// `dropped_count = total_recorded - len`.
#[derive(Clone, Debug)]
pub struct EvictedHashMap {
    entries: IndexMap<Key, Value>,
    capacity: usize,
    total_recorded: u32,
}

impl EvictedHashMap {
    /// Create a new `EvictedHashMap` with a given capacity.
    pub fn new(capacity: usize) -> Self {
        EvictedHashMap {
            // One extra slot so insertion before eviction never resizes.
            entries: IndexMap::with_capacity(capacity + 1),
            capacity,
            total_recorded: 0,
        }
    }

    /// Inserts a key-value pair into the map, evicting the
    /// least-recently-set entry if the map exceeds its capacity.
    pub fn insert(&mut self, item: KeyValue) {
        self.total_recorded = self.total_recorded.saturating_add(1);
        // Re-inserting moves the key to the back, refreshing its recency.
        self.entries.shift_remove(&item.key);
        self.entries.insert(item.key, item.value);
        if self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }

    /// The value recorded for `key`, if it has not been evicted.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The total number of writes, including writes of since-evicted and
    /// overwritten entries.
    pub fn total_recorded(&self) -> u32 {
        self.total_recorded
    }

    /// The number of writes not represented by a retained entry.
    pub fn dropped_count(&self) -> u32 {
        self.total_recorded - self.entries.len() as u32
    }

    /// Returns an iterator over the retained entries, least recently set
    /// first.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.entries.iter()
    }
}

impl Extend<KeyValue> for EvictedHashMap {
    fn extend<I: IntoIterator<Item = KeyValue>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.insert(item));
    }
}

impl<'a> IntoIterator for &'a EvictedHashMap {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_within_capacity_drops_nothing() {
        let mut map = EvictedHashMap::new(8);
        for i in 0..8_i64 {
            map.insert(KeyValue::new(format!("K{}", i), i));
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.dropped_count(), 0);
        assert_eq!(map.total_recorded(), 8);
    }

    #[test]
    fn overflow_evicts_least_recently_set() {
        let mut map = EvictedHashMap::new(8);
        for i in 0..16_i64 {
            map.insert(KeyValue::new(format!("K{}", i), i));
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.dropped_count(), 8);
        for i in 0..8_i64 {
            assert!(map.get(&format!("K{}", i)).is_none());
        }
        for i in 8..16_i64 {
            assert_eq!(map.get(&format!("K{}", i)), Some(&Value::I64(i)));
        }
    }

    #[test]
    fn reinsertion_refreshes_recency() {
        let mut map = EvictedHashMap::new(8);
        for i in 0..16_i64 {
            map.insert(KeyValue::new(format!("K{}", i), i));
        }
        // Re-set the four oldest original keys; they displace K8..K11.
        for i in 0..4_i64 {
            map.insert(KeyValue::new(format!("K{}", i), i));
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.dropped_count(), 12);
        for i in 12..16_i64 {
            assert_eq!(map.get(&format!("K{}", i)), Some(&Value::I64(i)));
        }
        for i in 0..4_i64 {
            assert_eq!(map.get(&format!("K{}", i)), Some(&Value::I64(i)));
        }
    }

    #[test]
    fn reinserting_existing_key_does_not_grow() {
        let mut map = EvictedHashMap::new(8);
        map.insert(KeyValue::new("K", 0_i64));
        map.insert(KeyValue::new("K", 1_i64));
        assert_eq!(map.len(), 1);
        assert_eq!(map.total_recorded(), 2);
        assert_eq!(map.dropped_count(), 1);
        assert_eq!(map.get("K"), Some(&Value::I64(1)));
    }

    #[test]
    fn extend_counts_every_entry() {
        let mut map = EvictedHashMap::new(2);
        map.extend(vec![
            KeyValue::new("a", 1_i64),
            KeyValue::new("b", 2_i64),
            KeyValue::new("c", 3_i64),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.total_recorded(), 3);
        assert_eq!(map.dropped_count(), 1);
        assert!(map.get("a").is_none());
    }

    #[test]
    fn iteration_order_is_least_recent_first() {
        let mut map = EvictedHashMap::new(3);
        map.insert(KeyValue::new("a", 1_i64));
        map.insert(KeyValue::new("b", 2_i64));
        map.insert(KeyValue::new("a", 3_i64));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
