use crate::workflows::decision::{CostModel, CostParameters, ThresholdGrid, ThresholdOptimizer};

pub(super) fn business_costs() -> CostModel {
    CostModel::new(CostParameters::default()).expect("default costs are valid")
}

/// Granted good payers earn 1, granted defaulters cost 1, refusals are free.
pub(super) fn unit_costs() -> CostModel {
    CostModel::new(CostParameters {
        cost_false_negative: 1.0,
        cost_false_positive: 0.0,
        revenue_true_positive: 1.0,
        value_true_negative: 0.0,
    })
    .expect("unit costs are valid")
}

pub(super) fn quarter_grid() -> ThresholdGrid {
    ThresholdGrid::uniform(5).expect("five grid points")
}

pub(super) fn default_optimizer() -> ThresholdOptimizer {
    ThresholdOptimizer::new(business_costs(), ThresholdGrid::default())
}

/// Deterministic labelled sample: higher scores repay more often.
pub(super) fn scored_sample() -> (Vec<u8>, Vec<f64>) {
    let scores: Vec<f64> = (0..200).map(|i| ((i * 37) % 200) as f64 / 199.0).collect();
    let labels = scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let defaulted = *score < 0.35 || (*score < 0.6 && i % 3 == 0) || i % 17 == 0;
            u8::from(defaulted)
        })
        .collect();
    (labels, scores)
}
