use crate::workflows::decision::{ThresholdGrid, MAX_GRID_POINTS};
use crate::workflows::error::RiskError;

#[test]
fn uniform_grid_includes_endpoints() {
    let grid = ThresholdGrid::uniform(5).expect("grid");
    assert_eq!(grid.points(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn step_grid_matches_default_resolution() {
    let grid = ThresholdGrid::from_step(0.01).expect("grid");
    assert_eq!(grid.len(), 101);
    assert_eq!(grid, ThresholdGrid::default());
    assert_eq!(grid.points()[50], 0.5);
}

#[test]
fn uneven_step_still_reaches_one() {
    let grid = ThresholdGrid::from_step(0.3).expect("grid");
    assert_eq!(grid.len(), 5);
    assert_eq!(grid.points()[0], 0.0);
    assert_eq!(grid.points()[4], 1.0);
    assert!(grid.points().windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn invalid_resolution_is_rejected() {
    for step in [0.0, -0.1, 1.5, f64::NAN] {
        assert!(matches!(
            ThresholdGrid::from_step(step),
            Err(RiskError::InvalidParameter {
                name: "threshold_step",
                ..
            })
        ));
    }
    assert!(ThresholdGrid::uniform(1).is_err());
}

#[test]
fn oversized_grids_are_rejected() {
    for step in [1e-300, 1e-9, f64::MIN_POSITIVE] {
        match ThresholdGrid::from_step(step) {
            Err(RiskError::InvalidParameter { name, .. }) => assert_eq!(name, "threshold_step"),
            other => panic!("expected invalid step, got {other:?}"),
        }
    }
    assert!(ThresholdGrid::uniform(MAX_GRID_POINTS + 1).is_err());
    assert_eq!(
        ThresholdGrid::from_step(1e-4).expect("fine but bounded grid").len(),
        10_001
    );
}
