//! An ordered index of charging stations.
//!
//! Stations live in an AVL tree keyed by their identifier. On top of the tree
//! the crate answers range and threshold queries, selects the best `k`
//! stations for a weighted score with a bounded min-heap, and filters stations
//! with small postfix rules such as `slots 1 >= power 50 >= &&`.
mod arena;
mod debug;
mod events;
mod expression;
mod index;
mod lexer;
mod operators;
mod queries;
mod station;
mod top_k;

pub use crate::{
    debug::{InvariantViolation, Sideways},
    events::{Action, StationDefaults, StationEvent},
    expression::{evaluate, Expression, ExpressionError},
    index::{Entry, InsertOutcome, Iter, StationIndex},
    lexer::Token,
    operators::{ComparisonOperator, LogicalOperator},
    station::{Attribute, StationId, StationRecord},
    top_k::{QueryError, ScoreWeights, ScoredCandidate},
};
