//! Debug views of the station index.
//!
//! [`Sideways`] renders the tree rotated by 90 degrees, and
//! [`StationIndex::check_invariants`] walks the whole tree to verify the
//! order and balance invariants and the memoized heights.

use crate::{
    arena::EntryIndex,
    index::StationIndex,
    station::StationId,
};
use std::fmt;
use thiserror::Error;

const INDENT: &str = "    ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("station {key} is out of order: expected a key in ({lower:?}, {upper:?})")]
    Order {
        key: StationId,
        lower: Option<StationId>,
        upper: Option<StationId>,
    },
    #[error("station {key} has a balance factor of {balance}")]
    Balance { key: StationId, balance: i32 },
    #[error("station {key} stores height {stored} but its subtree has height {actual}")]
    Height {
        key: StationId,
        stored: i32,
        actual: i32,
    },
    #[error("the index reports {reported} stations but {reachable} are reachable from the root")]
    Unreachable { reported: usize, reachable: usize },
}

/// Renders a [`StationIndex`] with the right subtree on top.
///
/// Every line holds one station, indented by its depth:
/// `<id>(h=<height>) P=<power>KW Price=<price>c Slots=<slots>`.
pub struct Sideways<'a> {
    index: &'a StationIndex,
}

impl StationIndex {
    pub fn sideways(&self) -> Sideways<'_> {
        Sideways { index: self }
    }

    /// Verifies the order and balance invariants along with every stored height.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        self.check_subtree(self.root, None, None, &mut reachable)?;
        if reachable != self.len() {
            return Err(InvariantViolation::Unreachable {
                reported: self.len(),
                reachable,
            });
        }
        Ok(())
    }

    /// Returns the height of the subtree rooted at `node`.
    fn check_subtree(
        &self,
        node: Option<EntryIndex>,
        lower: Option<StationId>,
        upper: Option<StationId>,
        reachable: &mut usize,
    ) -> Result<i32, InvariantViolation> {
        let Some(idx) = node else {
            return Ok(-1);
        };
        *reachable += 1;
        let entry = &self.entries[idx];
        let key = entry.key;

        if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
            return Err(InvariantViolation::Order { key, lower, upper });
        }

        let left = self.check_subtree(entry.left, lower, Some(key), reachable)?;
        let right = self.check_subtree(entry.right, Some(key), upper, reachable)?;

        let balance = left - right;
        if balance.abs() > 1 {
            return Err(InvariantViolation::Balance { key, balance });
        }

        let actual = 1 + left.max(right);
        if entry.height != actual {
            return Err(InvariantViolation::Height {
                key,
                stored: entry.height,
                actual,
            });
        }
        Ok(actual)
    }
}

impl Sideways<'_> {
    fn write_subtree(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: Option<EntryIndex>,
        depth: usize,
    ) -> fmt::Result {
        let Some(idx) = node else {
            return Ok(());
        };
        let entry = &self.index.entries[idx];
        self.write_subtree(f, entry.right, depth + 1)?;
        writeln!(
            f,
            "{}{}(h={}) P={}KW Price={}c Slots={}",
            INDENT.repeat(depth),
            entry.key,
            entry.height,
            entry.value.power_kw,
            entry.value.price_cents,
            entry.value.slots_free,
        )?;
        self.write_subtree(f, entry.left, depth + 1)
    }
}

impl fmt::Display for Sideways<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.index.root, 0)
    }
}
