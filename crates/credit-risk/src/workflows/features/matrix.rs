use std::collections::BTreeSet;

use super::domain::columns;
use super::table::{ColumnValues, FeatureTable};
use crate::workflows::error::RiskError;

/// Numeric, model-facing view of an engineered table.
///
/// Identifier and label columns are dropped, text columns are one-hot encoded
/// as `<COLUMN>_<category>` indicators (categories in lexicographic order).
/// Row order follows the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMatrix {
    feature_names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    labels: Option<Vec<u8>>,
    rows: usize,
}

impl ModelMatrix {
    pub fn from_table(table: &FeatureTable, excluded: &[String]) -> Result<Self, RiskError> {
        let labels = match table.column(columns::TARGET) {
            Some(_) => Some(labels_from_cells(table.numeric(columns::TARGET)?)?),
            None => None,
        };

        let mut feature_names = Vec::new();
        let mut matrix_columns = Vec::new();

        for column in table.columns() {
            if excluded.iter().any(|name| name == &column.name) {
                continue;
            }

            match &column.values {
                ColumnValues::Numeric(values) => {
                    feature_names.push(column.name.clone());
                    matrix_columns.push(values.clone());
                }
                ColumnValues::Text(values) => {
                    let categories: BTreeSet<&str> =
                        values.iter().flatten().map(String::as_str).collect();
                    for category in categories {
                        feature_names.push(format!("{}_{}", column.name, category));
                        matrix_columns.push(
                            values
                                .iter()
                                .map(|cell| {
                                    let hit = cell.as_deref() == Some(category);
                                    Some(if hit { 1.0 } else { 0.0 })
                                })
                                .collect(),
                        );
                    }
                }
            }
        }

        Ok(Self {
            feature_names,
            columns: matrix_columns,
            labels,
            rows: table.row_count(),
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.feature_names
            .iter()
            .position(|feature| feature == name)
            .map(|index| self.columns[index].as_slice())
    }

    pub fn row(&self, index: usize) -> Option<Vec<Option<f64>>> {
        (index < self.rows).then(|| self.columns.iter().map(|column| column[index]).collect())
    }

    pub fn labels(&self) -> Option<&[u8]> {
        self.labels.as_deref()
    }
}

/// Validate a label column: every cell must be exactly 0 or 1.
pub fn labels_from_cells(cells: &[Option<f64>]) -> Result<Vec<u8>, RiskError> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            Some(value) if *value == 0.0 => Ok(0),
            Some(value) if *value == 1.0 => Ok(1),
            Some(value) => Err(RiskError::InvalidLabel { row, value: *value }),
            None => Err(RiskError::InvalidLabel {
                row,
                value: f64::NAN,
            }),
        })
        .collect()
}
