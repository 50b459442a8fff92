//! Cost-sensitive approval decisions.
//!
//! Scores are repayment-oriented: an application is granted when its score is
//! at or above the threshold. Use [`repayment_score`] to convert a
//! probability-of-default output first.

pub mod cost;
pub mod decider;
pub mod grid;
pub mod optimizer;

#[cfg(test)]
mod tests;

pub use cost::{ConfusionCounts, CostModel, CostParameters};
pub use decider::{decide, repayment_score, CreditDecision, Decider};
pub use grid::{ThresholdGrid, MAX_GRID_POINTS};
pub use optimizer::{
    ConfusionAccumulator, ThresholdEvaluation, ThresholdOptimizer, ThresholdSelection,
};
