use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::workflows::error::RiskError;

/// Business cost and revenue per decision outcome. All values are magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Granting credit to an applicant who later defaults.
    pub cost_false_negative: f64,
    /// Refusing an applicant who would have repaid.
    pub cost_false_positive: f64,
    /// Granting credit to an applicant who repays.
    pub revenue_true_positive: f64,
    /// Refusing an applicant who would have defaulted.
    #[serde(default)]
    pub value_true_negative: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            cost_false_negative: 10.0,
            cost_false_positive: 1.0,
            revenue_true_positive: 5.0,
            value_true_negative: 0.0,
        }
    }
}

/// Outcome counts for one threshold over a labelled sample.
///
/// The decision is the positive class: a positive is a granted application.
/// `true_positive` = granted and repaid, `false_negative` = granted and
/// defaulted, `false_positive` = refused but would have repaid,
/// `true_negative` = refused and would have defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionCounts {
    /// Tally one row. `label` follows `TARGET`: 1 = defaulted, 0 = repaid.
    pub fn record(&mut self, granted: bool, label: u8) {
        match (granted, label == 1) {
            (true, false) => self.true_positive += 1,
            (true, true) => self.false_negative += 1,
            (false, false) => self.false_positive += 1,
            (false, true) => self.true_negative += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn granted(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    pub fn approval_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.granted() as f64 / total as f64,
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_positive += other.true_positive;
        self.false_positive += other.false_positive;
        self.true_negative += other.true_negative;
        self.false_negative += other.false_negative;
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// Immutable scorer turning confusion counts into money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    params: CostParameters,
}

impl CostModel {
    pub fn new(params: CostParameters) -> Result<Self, RiskError> {
        for (name, value) in [
            ("cost_false_negative", params.cost_false_negative),
            ("cost_false_positive", params.cost_false_positive),
            ("revenue_true_positive", params.revenue_true_positive),
            ("value_true_negative", params.value_true_negative),
        ] {
            if !value.is_finite() {
                return Err(RiskError::invalid_parameter(name, value, "must be finite"));
            }
            if value < 0.0 {
                return Err(RiskError::invalid_parameter(name, value, "must be non-negative"));
            }
        }

        Ok(Self { params })
    }

    pub fn params(&self) -> &CostParameters {
        &self.params
    }

    /// `TP * revenue + TN * tn_value - FP * fp_cost - FN * fn_cost`.
    pub fn net_value(&self, counts: &ConfusionCounts) -> f64 {
        let p = &self.params;
        counts.true_positive as f64 * p.revenue_true_positive
            + counts.true_negative as f64 * p.value_true_negative
            - counts.false_positive as f64 * p.cost_false_positive
            - counts.false_negative as f64 * p.cost_false_negative
    }

    /// Loss framing of [`net_value`](Self::net_value).
    pub fn expected_cost(&self, counts: &ConfusionCounts) -> f64 {
        -self.net_value(counts)
    }
}
