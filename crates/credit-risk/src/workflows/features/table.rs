use std::collections::HashSet;

use serde::Serialize;

use super::domain::{columns, ApplicantRecord, REQUIRED_COLUMNS};
use crate::workflows::error::SchemaError;

/// Cell storage for a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn same_kind(&self, other: &ColumnValues) -> bool {
        matches!(
            (self, other),
            (ColumnValues::Numeric(_), ColumnValues::Numeric(_))
                | (ColumnValues::Text(_), ColumnValues::Text(_))
        )
    }

    fn is_all_missing(&self) -> bool {
        match self {
            ColumnValues::Numeric(values) => values.iter().all(Option::is_none),
            ColumnValues::Text(values) => values.iter().all(Option::is_none),
        }
    }

    /// Kinds can be reconciled when they match or one side carries no values.
    fn compatible_with(&self, other: &ColumnValues) -> bool {
        self.same_kind(other) || self.is_all_missing() || other.is_all_missing()
    }

    /// All-missing cells of this column's kind.
    fn missing_like(&self, len: usize) -> ColumnValues {
        match self {
            ColumnValues::Numeric(_) => ColumnValues::Numeric(vec![None; len]),
            ColumnValues::Text(_) => ColumnValues::Text(vec![None; len]),
        }
    }

    /// Append `other`. An all-missing side adopts the kind of the other side,
    /// since CSV inference cannot tell the kind of an empty column.
    fn extend(&mut self, other: ColumnValues) {
        let other = if self.same_kind(&other) {
            other
        } else if other.is_all_missing() {
            self.missing_like(other.len())
        } else {
            *self = other.missing_like(self.len());
            other
        };

        match (self, other) {
            (ColumnValues::Numeric(values), ColumnValues::Numeric(more)) => values.extend(more),
            (ColumnValues::Text(values), ColumnValues::Text(more)) => values.extend(more),
            _ => unreachable!("column kinds are reconciled before extending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }
}

/// Column-oriented table with a fixed row order.
///
/// Every column has the same length. Row identity is positional: no operation
/// on the table sorts, filters, or deduplicates rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureTable {
    columns: Vec<Column>,
    rows: usize,
}

impl FeatureTable {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let rows = columns.first().map(|column| column.values.len()).unwrap_or(0);
        let mut seen = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
            if column.values.len() != rows {
                return Err(SchemaError::RaggedColumn {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.values.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from typed records. The six required columns are always
    /// present; identifier, label, and contract type only when some record has them.
    pub fn from_records(records: &[ApplicantRecord]) -> Self {
        let numeric = |pick: fn(&ApplicantRecord) -> Option<f64>| -> Vec<Option<f64>> {
            records.iter().map(pick).collect()
        };

        let mut table_columns = Vec::with_capacity(REQUIRED_COLUMNS.len() + 3);
        if records.iter().any(|record| record.sk_id_curr.is_some()) {
            table_columns.push(Column::numeric(
                columns::SK_ID_CURR,
                numeric(|r| r.sk_id_curr),
            ));
        }
        table_columns.push(Column::numeric(columns::DAYS_BIRTH, numeric(|r| r.days_birth)));
        table_columns.push(Column::numeric(
            columns::DAYS_EMPLOYED,
            numeric(|r| r.days_employed),
        ));
        table_columns.push(Column::numeric(columns::AMT_CREDIT, numeric(|r| r.amt_credit)));
        table_columns.push(Column::numeric(
            columns::AMT_INCOME_TOTAL,
            numeric(|r| r.amt_income_total),
        ));
        table_columns.push(Column::numeric(columns::AMT_ANNUITY, numeric(|r| r.amt_annuity)));
        table_columns.push(Column::numeric(
            columns::CNT_FAM_MEMBERS,
            numeric(|r| r.cnt_fam_members),
        ));
        if records.iter().any(|record| record.target.is_some()) {
            table_columns.push(Column::numeric(
                columns::TARGET,
                numeric(|r| r.target.map(f64::from)),
            ));
        }
        if records.iter().any(|record| record.name_contract_type.is_some()) {
            table_columns.push(Column::text(
                columns::NAME_CONTRACT_TYPE,
                records
                    .iter()
                    .map(|record| record.name_contract_type.clone())
                    .collect(),
            ));
        }

        Self {
            columns: table_columns,
            rows: records.len(),
        }
    }

    /// Concatenate chunks in order. All chunks must share names, order, and
    /// kinds; a column that is entirely missing in a chunk takes the other kind.
    pub fn concat(chunks: Vec<FeatureTable>) -> Result<Self, SchemaError> {
        let mut chunks = chunks.into_iter();
        let Some(mut merged) = chunks.next() else {
            return Ok(Self::default());
        };

        for (offset, chunk) in chunks.enumerate() {
            let compatible = chunk.columns.len() == merged.columns.len()
                && chunk.columns.iter().zip(&merged.columns).all(|(a, b)| {
                    a.name == b.name && a.values.compatible_with(&b.values)
                });
            if !compatible {
                return Err(SchemaError::IncompatibleChunk { chunk: offset + 1 });
            }

            merged.rows += chunk.rows;
            for (target, column) in merged.columns.iter_mut().zip(chunk.columns) {
                target.values.extend(column.values);
            }
        }

        Ok(merged)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Fail on the first absent column, in the order given.
    pub fn require(&self, names: &[&str]) -> Result<(), SchemaError> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(name) => Err(SchemaError::MissingColumn((*name).to_string())),
            None => Ok(()),
        }
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], SchemaError> {
        match self.column(name).map(|column| &column.values) {
            Some(ColumnValues::Numeric(values)) => Ok(values),
            Some(ColumnValues::Text(_)) => Err(SchemaError::NotNumeric(name.to_string())),
            None => Err(SchemaError::MissingColumn(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<&[Option<String>], SchemaError> {
        match self.column(name).map(|column| &column.values) {
            Some(ColumnValues::Text(values)) => Ok(values),
            Some(ColumnValues::Numeric(_)) => Err(SchemaError::NotNumeric(name.to_string())),
            None => Err(SchemaError::MissingColumn(name.to_string())),
        }
    }

    /// Replace a column in place (keeping its position) or append it.
    pub fn upsert_numeric(
        &mut self,
        name: &str,
        values: Vec<Option<f64>>,
    ) -> Result<(), SchemaError> {
        if !self.columns.is_empty() && values.len() != self.rows {
            return Err(SchemaError::RaggedColumn {
                column: name.to_string(),
                expected: self.rows,
                actual: values.len(),
            });
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        }

        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(column) => column.values = ColumnValues::Numeric(values),
            None => self.columns.push(Column::numeric(name, values)),
        }
        Ok(())
    }

    pub(crate) fn numeric_columns_mut(
        &mut self,
    ) -> impl Iterator<Item = (&str, &mut Vec<Option<f64>>)> {
        self.columns
            .iter_mut()
            .filter_map(|column| match &mut column.values {
                ColumnValues::Numeric(values) => Some((column.name.as_str(), values)),
                ColumnValues::Text(_) => None,
            })
    }
}
