use crate::workflows::error::RiskError;

/// Upper bound on grid size; every point carries its own confusion counts.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Ascending, deterministic set of candidate thresholds covering [0, 1].
///
/// Both endpoints are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdGrid {
    points: Vec<f64>,
}

impl ThresholdGrid {
    /// `points` evenly spaced thresholds, `0.0` and `1.0` included.
    pub fn uniform(points: usize) -> Result<Self, RiskError> {
        if points < 2 {
            return Err(RiskError::invalid_parameter(
                "grid_points",
                points as f64,
                "need at least two grid points",
            ));
        }
        if points > MAX_GRID_POINTS {
            return Err(RiskError::invalid_parameter(
                "grid_points",
                points as f64,
                "exceeds the maximum grid size",
            ));
        }

        let last = (points - 1) as f64;
        Ok(Self {
            points: (0..points).map(|i| i as f64 / last).collect(),
        })
    }

    /// Multiples of `step` up to 1.0, with 1.0 appended when `step` does not divide it.
    pub fn from_step(step: f64) -> Result<Self, RiskError> {
        if !(step.is_finite() && step > 0.0 && step <= 1.0) {
            return Err(RiskError::invalid_parameter(
                "threshold_step",
                step,
                "must lie in (0, 1]",
            ));
        }

        let intervals = (1.0 / step).round();
        if intervals + 2.0 > MAX_GRID_POINTS as f64 {
            return Err(RiskError::invalid_parameter(
                "threshold_step",
                step,
                "too fine: grid would exceed the maximum size",
            ));
        }
        if ((intervals * step) - 1.0).abs() < 1e-9 {
            return Self::uniform(intervals as usize + 1);
        }

        let mut points: Vec<f64> = (0..)
            .map(|i| i as f64 * step)
            .take_while(|t| *t < 1.0)
            .collect();
        points.push(1.0);
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        Self {
            points: (0..=100).map(|i| i as f64 / 100.0).collect(),
        }
    }
}
