use crate::{
    index::StationIndex,
    station::{StationId, StationRecord},
};
use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, TryReserveError},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("cannot reserve room for {requested} scored candidates")]
    OutOfMemory {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Weights of the linear station score
/// `slots_free * alpha + power_kw * beta - price_cents * gamma`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWeights {
    pub alpha: i32,
    pub beta: i32,
    pub gamma: i32,
}

impl ScoreWeights {
    pub const fn new(alpha: i32, beta: i32, gamma: i32) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Fixed-point score of `record`; saturates instead of overflowing.
    pub fn score(&self, record: &StationRecord) -> i64 {
        let term = |value: i32, weight: i32| i64::from(value).saturating_mul(i64::from(weight));
        term(record.slots_free, self.alpha)
            .saturating_add(term(record.power_kw, self.beta))
            .saturating_sub(term(record.price_cents, self.gamma))
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::new(2, 1, 1)
    }
}

/// A station together with its score.
///
/// Candidates are ordered from worst to best: by score, and between equal
/// scores the lower station identifier ranks higher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub station_id: StationId,
    pub score: i64,
}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.station_id.cmp(&self.station_id))
    }
}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the best `capacity` candidates offered to it, the worst one at the root.
struct BoundedMinHeap {
    heap: BinaryHeap<Reverse<ScoredCandidate>>,
    capacity: usize,
}

impl BoundedMinHeap {
    fn with_capacity(capacity: usize) -> Result<Self, QueryError> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|source| QueryError::OutOfMemory {
                requested: capacity,
                source,
            })?;
        Ok(Self {
            heap: BinaryHeap::from(storage),
            capacity,
        })
    }

    fn offer(&mut self, candidate: ScoredCandidate) {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate > worst.0 {
                *worst = Reverse(candidate);
            }
        }
    }

    /// Drains the heap, best candidate first.
    fn into_sorted(self) -> Vec<ScoredCandidate> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(candidate)| candidate)
            .collect()
    }
}

impl StationIndex {
    /// Returns the identifiers of the `k` best-scoring stations, best first.
    ///
    /// Fewer than `k` identifiers are returned when the index holds fewer
    /// stations.
    pub fn top_k_by_score(
        &self,
        k: usize,
        weights: ScoreWeights,
    ) -> Result<Vec<StationId>, QueryError> {
        let candidates = self.top_k_scored(k, weights)?;
        Ok(candidates
            .into_iter()
            .map(|candidate| candidate.station_id)
            .collect())
    }

    /// Like [`StationIndex::top_k_by_score`], keeping each station's score.
    pub fn top_k_scored(
        &self,
        k: usize,
        weights: ScoreWeights,
    ) -> Result<Vec<ScoredCandidate>, QueryError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut heap = BoundedMinHeap::with_capacity(k.min(self.len()))?;
        for (station_id, record) in self {
            heap.offer(ScoredCandidate {
                station_id,
                score: weights.score(record),
            });
        }

        let best = heap.into_sorted();
        debug!(k, selected = best.len(), ?weights, "top-k selection");
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use proptest::prelude::*;

    #[test]
    fn compute_the_weighted_score() {
        let weights = ScoreWeights::new(2, 1, 1);

        assert_eq!(weights.score(&StationRecord::new(50, 200, 3, 0)), -144);
        assert_eq!(weights.score(&StationRecord::new(150, 300, 5, 0)), -140);
    }

    #[test]
    fn saturate_instead_of_overflowing() {
        let weights = ScoreWeights::new(i32::MAX, i32::MAX, i32::MIN);
        let record = StationRecord::new(i32::MAX, i32::MAX, i32::MAX, 0);

        assert_eq!(weights.score(&record), i64::MAX);
    }

    #[test]
    fn select_the_best_station_of_two() {
        let index: StationIndex = [
            (1, StationRecord::new(100, 200, 5, 0)),
            (2, StationRecord::new(20, 50, 1, 0)),
        ]
        .into_iter()
        .collect();
        let weights = ScoreWeights::new(1, 1, 1);

        assert_eq!(weights.score(index.find(1).unwrap()), 5 + 100 - 200);
        assert_eq!(weights.score(index.find(2).unwrap()), 1 + 20 - 50);
        assert_eq!(index.top_k_by_score(1, weights), Ok(vec![2]));
    }

    #[test]
    fn return_scores_in_descending_order() {
        let index: StationIndex = [
            (10, StationRecord::new(50, 300, 2, 0)),
            (20, StationRecord::new(150, 300, 2, 0)),
            (30, StationRecord::new(100, 300, 2, 0)),
            (40, StationRecord::new(22, 300, 2, 0)),
        ]
        .into_iter()
        .collect();

        let best = index.top_k_scored(3, ScoreWeights::new(0, 1, 0)).unwrap();

        assert_eq!(
            best,
            vec![
                ScoredCandidate { station_id: 20, score: 150 },
                ScoredCandidate { station_id: 30, score: 100 },
                ScoredCandidate { station_id: 10, score: 50 },
            ]
        );
    }

    #[test]
    fn prefer_the_lower_identifier_between_equal_scores() {
        let index: StationIndex = (1..=5)
            .rev()
            .map(|key| (key, StationRecord::new(50, 300, 2, 0)))
            .collect();

        assert_eq!(index.top_k_by_score(3, ScoreWeights::default()), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn return_every_station_when_k_exceeds_the_index() {
        let index: StationIndex = (1..=3)
            .map(|key| (key, StationRecord::new(key as i32, 0, 0, 0)))
            .collect();

        assert_eq!(
            index.top_k_by_score(10, ScoreWeights::new(0, 1, 0)),
            Ok(vec![3, 2, 1])
        );
    }

    #[test]
    fn return_nothing_for_k_zero_or_an_empty_index() {
        let index: StationIndex = [(1, StationRecord::default())].into_iter().collect();

        assert_eq!(index.top_k_by_score(0, ScoreWeights::default()), Ok(vec![]));
        assert_eq!(
            StationIndex::new().top_k_by_score(5, ScoreWeights::default()),
            Ok(vec![])
        );
    }

    #[test]
    fn keep_only_the_best_candidates_in_the_heap() {
        let mut heap = BoundedMinHeap::with_capacity(2).unwrap();

        for (station_id, score) in [(1, 5), (2, 1), (3, 9), (4, 3), (5, 9)] {
            heap.offer(ScoredCandidate { station_id, score });
        }

        assert_eq!(
            heap.into_sorted(),
            vec![
                ScoredCandidate { station_id: 3, score: 9 },
                ScoredCandidate { station_id: 5, score: 9 },
            ]
        );
    }

    #[test]
    fn report_a_failed_reservation() {
        let result = BoundedMinHeap::with_capacity(usize::MAX);

        assert!(matches!(
            result,
            Err(QueryError::OutOfMemory { requested: usize::MAX, .. })
        ));
    }

    proptest! {
        #[test]
        fn select_the_k_largest_scores(
            stations in prop::collection::btree_map(
                -1000i64..1000,
                (0i32..400, 0i32..1000, 0i32..10),
                0..80,
            ),
            k in 0usize..100,
            alpha in -5i32..20,
            beta in -5i32..5,
            gamma in -5i32..5,
        ) {
            let weights = ScoreWeights::new(alpha, beta, gamma);
            let index: StationIndex = stations
                .iter()
                .map(|(&key, &(power, price, slots))| (key, StationRecord::new(power, price, slots, 0)))
                .collect();

            let expected = index
                .iter()
                .map(|(station_id, record)| ScoredCandidate { station_id, score: weights.score(record) })
                .sorted_by(|a, b| b.cmp(a))
                .take(k)
                .collect_vec();
            let actual = index.top_k_scored(k, weights).unwrap();

            prop_assert_eq!(actual.len(), k.min(index.len()));
            prop_assert!(actual.iter().map(|candidate| candidate.station_id).all_unique());
            prop_assert_eq!(actual, expected);
        }
    }
}
