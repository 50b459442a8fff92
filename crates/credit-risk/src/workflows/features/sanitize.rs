use std::collections::BTreeMap;

use serde::Serialize;

use super::table::FeatureTable;

/// Per-column count of cells replaced by the missing marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitationReport {
    pub replaced_by_column: BTreeMap<String, usize>,
}

impl SanitationReport {
    pub fn total(&self) -> usize {
        self.replaced_by_column.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &SanitationReport) {
        for (column, count) in &other.replaced_by_column {
            *self.replaced_by_column.entry(column.clone()).or_default() += count;
        }
    }
}

/// Holds for a missing cell or a finite number.
pub fn is_finite_or_missing(cell: Option<f64>) -> bool {
    cell.map_or(true, f64::is_finite)
}

/// Replace every non-finite numeric cell (`+inf`, `-inf`, `NaN`) with missing.
pub fn sanitize_non_finite(table: &mut FeatureTable) -> SanitationReport {
    let mut report = SanitationReport::default();

    for (name, values) in table.numeric_columns_mut() {
        let mut replaced = 0;
        for cell in values.iter_mut() {
            if !is_finite_or_missing(*cell) {
                *cell = None;
                replaced += 1;
            }
        }
        if replaced > 0 {
            report.replaced_by_column.insert(name.to_string(), replaced);
        }
    }

    report
}
