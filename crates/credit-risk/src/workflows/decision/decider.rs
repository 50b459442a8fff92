use serde::{Deserialize, Serialize};

use crate::workflows::error::RiskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditDecision {
    Grant,
    Refuse,
}

impl CreditDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Refuse => "refuse",
        }
    }

    pub const fn is_grant(self) -> bool {
        matches!(self, Self::Grant)
    }
}

/// Classification rule shared with the threshold optimizer.
pub(crate) fn grants(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Grant iff `score >= threshold`. Both values must lie in [0, 1].
pub fn decide(score: f64, threshold: f64) -> Result<CreditDecision, RiskError> {
    check_probability("score", score)?;
    check_probability("threshold", threshold)?;

    Ok(if grants(score, threshold) {
        CreditDecision::Grant
    } else {
        CreditDecision::Refuse
    })
}

/// Convert a probability of default into the repayment-oriented score the
/// decision layer thresholds on.
pub fn repayment_score(default_probability: f64) -> Result<f64, RiskError> {
    check_probability("default_probability", default_probability)?;
    Ok(1.0 - default_probability)
}

/// A validated threshold bound for repeated decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decider {
    threshold: f64,
}

impl Decider {
    pub fn new(threshold: f64) -> Result<Self, RiskError> {
        check_probability("threshold", threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decide(&self, score: f64) -> Result<CreditDecision, RiskError> {
        decide(score, self.threshold)
    }
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), RiskError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RiskError::invalid_parameter(name, value, "must lie in [0, 1]"))
    }
}
