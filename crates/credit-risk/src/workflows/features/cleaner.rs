use rayon::prelude::*;
use serde::Serialize;

use super::domain::{columns, DAYS_EMPLOYED_SENTINEL};
use super::table::FeatureTable;
use crate::workflows::error::SchemaError;

/// Counts of the corrections applied by [`RecordCleaner`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows: usize,
    pub days_birth_sign_flips: usize,
    pub days_employed_sentinels: usize,
}

impl CleaningReport {
    pub fn merge(&mut self, other: &CleaningReport) {
        self.rows += other.rows;
        self.days_birth_sign_flips += other.days_birth_sign_flips;
        self.days_employed_sentinels += other.days_employed_sentinels;
    }
}

/// Fixes the known defects of raw application rows.
///
/// - `DAYS_BIRTH` is stored as a non-positive day count; it becomes its magnitude.
/// - `DAYS_EMPLOYED == 365243` is a placeholder and becomes missing.
///
/// Everything else, including other columns, passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCleaner;

impl RecordCleaner {
    pub const REQUIRED_COLUMNS: [&'static str; 2] = [columns::DAYS_BIRTH, columns::DAYS_EMPLOYED];

    pub fn clean(&self, table: &FeatureTable) -> Result<(FeatureTable, CleaningReport), SchemaError> {
        table.require(&Self::REQUIRED_COLUMNS)?;

        let (days_birth, flips): (Vec<Option<f64>>, Vec<bool>) = table
            .numeric(columns::DAYS_BIRTH)?
            .par_iter()
            .map(|value| clean_days_birth(*value))
            .unzip();
        let (days_employed, sentinels): (Vec<Option<f64>>, Vec<bool>) = table
            .numeric(columns::DAYS_EMPLOYED)?
            .par_iter()
            .map(|value| clean_days_employed(*value))
            .unzip();

        let report = CleaningReport {
            rows: table.row_count(),
            days_birth_sign_flips: flips.iter().filter(|flag| **flag).count(),
            days_employed_sentinels: sentinels.iter().filter(|flag| **flag).count(),
        };

        let mut cleaned = table.clone();
        cleaned.upsert_numeric(columns::DAYS_BIRTH, days_birth)?;
        cleaned.upsert_numeric(columns::DAYS_EMPLOYED, days_employed)?;

        Ok((cleaned, report))
    }
}

fn clean_days_birth(value: Option<f64>) -> (Option<f64>, bool) {
    match value {
        Some(days) if days < 0.0 => (Some(days.abs()), true),
        other => (other, false),
    }
}

fn clean_days_employed(value: Option<f64>) -> (Option<f64>, bool) {
    match value {
        Some(days) if days == DAYS_EMPLOYED_SENTINEL => (None, true),
        other => (other, false),
    }
}
