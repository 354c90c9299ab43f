//! Read-only queries over the station index.

use crate::{
    arena::EntryIndex,
    expression::Expression,
    index::StationIndex,
    station::StationId,
};
use tracing::debug;

struct KeyRange {
    lo: StationId,
    hi: StationId,
    capacity: usize,
}

impl StationIndex {
    /// Returns the keys in `[lo, hi]` in ascending order, at most `capacity` of them.
    ///
    /// Subtrees that lie entirely outside the interval are never visited, so
    /// the cost is `O(k + log n)` for `k` matches.
    pub fn range_keys(&self, lo: StationId, hi: StationId, capacity: usize) -> Vec<StationId> {
        if self.is_empty() || capacity == 0 || lo > hi {
            return Vec::new();
        }
        let range = KeyRange { lo, hi, capacity };
        let mut keys = Vec::new();
        self.collect_range(self.root, &range, &mut keys);
        debug!(lo, hi, found = keys.len(), "range query");
        keys
    }

    fn collect_range(&self, node: Option<EntryIndex>, range: &KeyRange, keys: &mut Vec<StationId>) {
        let Some(idx) = node else {
            return;
        };
        if keys.len() >= range.capacity {
            return;
        }
        let entry = &self.entries[idx];
        if entry.key > range.lo {
            self.collect_range(entry.left, range, keys);
        }
        if (range.lo..=range.hi).contains(&entry.key) && keys.len() < range.capacity {
            keys.push(entry.key);
        }
        if entry.key < range.hi {
            self.collect_range(entry.right, range, keys);
        }
    }

    /// Counts the stations rated at `threshold` kW or more.
    ///
    /// Power is unrelated to key order, so every station is visited.
    pub fn count_at_least(&self, threshold: i32) -> usize {
        self.iter()
            .filter(|(_, record)| record.power_kw >= threshold)
            .count()
    }

    /// Returns, in ascending key order, up to `limit` stations satisfying `expression`.
    ///
    /// The walk stops as soon as `limit` stations have matched.
    pub fn filter(&self, expression: &Expression, limit: usize) -> Vec<StationId> {
        let matches: Vec<_> = self
            .iter()
            .filter(|(_, record)| expression.evaluate(record))
            .map(|(key, _)| key)
            .take(limit)
            .collect();
        debug!(%expression, matches = matches.len(), "filtered stations");
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationRecord;
    use itertools::Itertools;
    use proptest::prelude::*;

    fn station(power_kw: i32, slots_free: i32) -> StationRecord {
        StationRecord::new(power_kw, 300, slots_free, 0)
    }

    fn sample() -> StationIndex {
        [
            (1001, station(22, 0)),
            (1005, station(50, 2)),
            (1010, station(150, 1)),
            (1100, station(350, 4)),
            (1120, station(22, 3)),
            (1150, station(100, 0)),
            (1200, station(50, 1)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn can_extract_keys_within_an_interval() {
        let index = sample();

        assert_eq!(index.range_keys(1100, 1150, 100), vec![1100, 1120, 1150]);
        assert_eq!(index.range_keys(1002, 1119, 100), vec![1005, 1010, 1100]);
        assert_eq!(index.range_keys(1010, 1010, 100), vec![1010]);
    }

    #[test]
    fn return_nothing_for_an_interval_without_keys() {
        let index = sample();

        assert!(index.range_keys(0, 1000, 100).is_empty());
        assert!(index.range_keys(1011, 1099, 100).is_empty());
        assert!(index.range_keys(1150, 1100, 100).is_empty());
    }

    #[test]
    fn return_nothing_without_capacity_or_stations() {
        assert!(sample().range_keys(0, 2000, 0).is_empty());
        assert!(StationIndex::new().range_keys(0, 2000, 10).is_empty());
    }

    #[test]
    fn truncate_the_range_at_capacity() {
        assert_eq!(sample().range_keys(1000, 2000, 2), vec![1001, 1005]);
    }

    #[test]
    fn count_stations_at_or_above_a_power_threshold() {
        let index = sample();

        assert_eq!(index.count_at_least(100), 3);
        assert_eq!(index.count_at_least(50), 5);
        assert_eq!(index.count_at_least(0), 7);
        assert_eq!(index.count_at_least(351), 0);
        assert_eq!(StationIndex::new().count_at_least(0), 0);
    }

    #[test]
    fn filter_stations_matching_a_rule() {
        let index = sample();
        let expression = Expression::parse("slots 1 >= power 50 >= &&").unwrap();

        assert_eq!(index.filter(&expression, 10), vec![1005, 1010, 1100, 1200]);
        assert_eq!(index.filter(&expression, 2), vec![1005, 1010]);
        assert!(index.filter(&expression, 0).is_empty());
    }

    #[test]
    fn filter_nothing_when_no_station_matches() {
        let expression = Expression::parse("power 1000 >=").unwrap();

        assert!(sample().filter(&expression, 10).is_empty());
    }

    proptest! {
        #[test]
        fn match_the_filtered_linearization(
            keys in prop::collection::btree_set(-500i64..500, 0..100),
            lo in -600i64..600,
            width in 0i64..400,
        ) {
            let index: StationIndex = keys.iter().map(|&key| (key, station(50, 1))).collect();
            let hi = lo + width;

            let expected = index
                .linearize(usize::MAX)
                .into_iter()
                .filter(|key| (lo..=hi).contains(key))
                .collect_vec();

            prop_assert_eq!(index.range_keys(lo, hi, usize::MAX), expected);
        }

        #[test]
        fn filter_keeps_the_first_matches_in_key_order(
            stations in prop::collection::btree_map(-500i64..500, (0i32..400, 0i32..5), 0..100),
            min_power in 0i64..400,
            limit in 0usize..20,
        ) {
            let index: StationIndex = stations
                .iter()
                .map(|(&key, &(power_kw, slots_free))| (key, station(power_kw, slots_free)))
                .collect();
            let expression = Expression::parse(&format!("power {min_power} >= slots 0 > &&")).unwrap();

            let expected = stations
                .iter()
                .filter(|&(_, &(power_kw, slots_free))| i64::from(power_kw) >= min_power && slots_free > 0)
                .map(|(&key, _)| key)
                .take(limit)
                .collect_vec();

            prop_assert_eq!(index.filter(&expression, limit), expected);
        }
    }
}
