//! Cost-minimising threshold search.
//!
//! Every grid point is scored; the net value surface need not be unimodal, so
//! there is no early exit or local search. Grid points are evaluated in
//! parallel and reduced by grid index:
//!
//! - the highest net value wins
//! - on an exact tie the lowest threshold wins, which approves more applicants

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::cost::{ConfusionCounts, CostModel};
use super::decider::{check_probability, grants, Decider};
use super::grid::ThresholdGrid;
use crate::workflows::error::{RiskError, SchemaError};

/// Score of a single threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdEvaluation {
    pub threshold: f64,
    pub counts: ConfusionCounts,
    pub net_value: f64,
}

/// The chosen threshold plus the full curve it was chosen from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSelection {
    pub threshold: f64,
    pub counts: ConfusionCounts,
    pub net_value: f64,
    pub expected_cost: f64,
    /// Every grid point, ascending by threshold.
    pub curve: Vec<ThresholdEvaluation>,
}

impl ThresholdSelection {
    pub fn approval_rate(&self) -> f64 {
        self.counts.approval_rate()
    }

    pub fn decider(&self) -> Result<Decider, RiskError> {
        Decider::new(self.threshold)
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdOptimizer {
    cost_model: CostModel,
    grid: ThresholdGrid,
}

impl ThresholdOptimizer {
    pub fn new(cost_model: CostModel, grid: ThresholdGrid) -> Self {
        Self { cost_model, grid }
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn grid(&self) -> &ThresholdGrid {
        &self.grid
    }

    /// Pick the threshold maximising net value over `(label, score)` pairs.
    pub fn optimize(&self, labels: &[u8], scores: &[f64]) -> Result<ThresholdSelection, RiskError> {
        validate_pairs(labels, scores)?;
        if labels.is_empty() {
            return Err(RiskError::InsufficientData {
                operation: "threshold optimization",
            });
        }

        let mut accumulator = self.accumulator();
        accumulator.observe(labels, scores)?;
        accumulator.select(&self.cost_model)
    }

    /// Empty accumulator on this optimizer's grid, for chunked input.
    pub fn accumulator(&self) -> ConfusionAccumulator {
        ConfusionAccumulator::new(&self.grid)
    }

    /// Score one arbitrary threshold, e.g. a fixed business default.
    pub fn evaluate_at(
        &self,
        threshold: f64,
        labels: &[u8],
        scores: &[f64],
    ) -> Result<ThresholdEvaluation, RiskError> {
        check_probability("threshold", threshold)?;
        validate_pairs(labels, scores)?;
        if labels.is_empty() {
            return Err(RiskError::InsufficientData {
                operation: "threshold evaluation",
            });
        }

        let counts = tally(threshold, labels, scores);
        Ok(ThresholdEvaluation {
            threshold,
            counts,
            net_value: self.cost_model.net_value(&counts),
        })
    }
}

/// Confusion counts per grid point, fed in any number of chunks.
///
/// Merging is associative and commutative, so chunk order and grouping do not
/// change the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionAccumulator {
    thresholds: Vec<f64>,
    counts: Vec<ConfusionCounts>,
}

impl ConfusionAccumulator {
    pub fn new(grid: &ThresholdGrid) -> Self {
        Self {
            thresholds: grid.points().to_vec(),
            counts: vec![ConfusionCounts::default(); grid.len()],
        }
    }

    pub fn observations(&self) -> u64 {
        self.counts.first().map(ConfusionCounts::total).unwrap_or(0)
    }

    /// Add one chunk. An empty chunk is a no-op.
    pub fn observe(&mut self, labels: &[u8], scores: &[f64]) -> Result<(), RiskError> {
        validate_pairs(labels, scores)?;

        self.counts
            .par_iter_mut()
            .zip(self.thresholds.par_iter())
            .for_each(|(counts, threshold)| *counts += tally(*threshold, labels, scores));

        debug!(rows = labels.len(), grid = self.thresholds.len(), "observed chunk");
        Ok(())
    }

    pub fn merge(mut self, other: ConfusionAccumulator) -> Result<Self, RiskError> {
        if self.thresholds != other.thresholds {
            return Err(RiskError::invalid_parameter(
                "grid",
                other.thresholds.len() as f64,
                "accumulators were built on different grids",
            ));
        }

        for (counts, more) in self.counts.iter_mut().zip(other.counts) {
            *counts += more;
        }
        Ok(self)
    }

    pub fn select(&self, cost_model: &CostModel) -> Result<ThresholdSelection, RiskError> {
        if self.observations() == 0 {
            return Err(RiskError::InsufficientData {
                operation: "threshold optimization",
            });
        }

        let curve: Vec<ThresholdEvaluation> = self
            .thresholds
            .iter()
            .zip(&self.counts)
            .map(|(threshold, counts)| ThresholdEvaluation {
                threshold: *threshold,
                counts: *counts,
                net_value: cost_model.net_value(counts),
            })
            .collect();

        // Strictly greater only, so the earliest (lowest) threshold keeps a tie.
        let mut best = curve[0];
        for candidate in &curve[1..] {
            if candidate.net_value > best.net_value {
                best = *candidate;
            }
        }

        debug!(
            threshold = best.threshold,
            net_value = best.net_value,
            approval_rate = best.counts.approval_rate(),
            "selected decision threshold"
        );

        Ok(ThresholdSelection {
            threshold: best.threshold,
            counts: best.counts,
            net_value: best.net_value,
            expected_cost: -best.net_value,
            curve,
        })
    }
}

fn tally(threshold: f64, labels: &[u8], scores: &[f64]) -> ConfusionCounts {
    let mut counts = ConfusionCounts::default();
    for (label, score) in labels.iter().zip(scores) {
        counts.record(grants(*score, threshold), *label);
    }
    counts
}

/// Length, label, and score checks, in that order.
fn validate_pairs(labels: &[u8], scores: &[f64]) -> Result<(), RiskError> {
    if labels.len() != scores.len() {
        return Err(SchemaError::LengthMismatch {
            left: "labels",
            left_len: labels.len(),
            right: "scores",
            right_len: scores.len(),
        }
        .into());
    }

    if let Some((row, label)) = labels.iter().enumerate().find(|(_, label)| **label > 1) {
        return Err(RiskError::InvalidLabel {
            row,
            value: f64::from(*label),
        });
    }

    for score in scores {
        check_probability("score", *score)?;
    }
    Ok(())
}
