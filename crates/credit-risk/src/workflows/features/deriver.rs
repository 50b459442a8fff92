use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::domain::{columns, DAYS_PER_YEAR};
use super::table::FeatureTable;
use crate::workflows::error::SchemaError;

/// Optional derived columns beyond the four domain ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationOptions {
    /// Adds `INCOME_PER_PERSON` and `DAYS_EMPLOYED_PERCENT`.
    pub household_features: bool,
}

/// Computes the domain ratio features from cleaned columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDeriver {
    options: DerivationOptions,
}

impl FeatureDeriver {
    pub const SOURCE_COLUMNS: [&'static str; 4] = [
        columns::AMT_CREDIT,
        columns::AMT_INCOME_TOTAL,
        columns::AMT_ANNUITY,
        columns::DAYS_BIRTH,
    ];

    pub fn new(options: DerivationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DerivationOptions {
        self.options
    }

    /// Names of the columns [`derive`](Self::derive) writes, in output order.
    pub fn derived_columns(&self) -> Vec<&'static str> {
        let mut names = vec![
            columns::CREDIT_INCOME_RATIO,
            columns::ANNUITY_INCOME_RATIO,
            columns::CREDIT_TERM,
            columns::AGE_YEARS,
        ];
        if self.options.household_features {
            names.push(columns::INCOME_PER_PERSON);
            names.push(columns::DAYS_EMPLOYED_PERCENT);
        }
        names
    }

    /// Returns a copy of `table` with the derived columns written (replacing any
    /// earlier values of the same name). Never consults `TARGET`, never drops rows.
    pub fn derive(&self, table: &FeatureTable) -> Result<FeatureTable, SchemaError> {
        table.require(&Self::SOURCE_COLUMNS)?;
        if self.options.household_features {
            table.require(&[columns::CNT_FAM_MEMBERS, columns::DAYS_EMPLOYED])?;
        }

        let credit = table.numeric(columns::AMT_CREDIT)?;
        let income = table.numeric(columns::AMT_INCOME_TOTAL)?;
        let annuity = table.numeric(columns::AMT_ANNUITY)?;
        let days_birth = table.numeric(columns::DAYS_BIRTH)?;

        let mut derived = vec![
            (columns::CREDIT_INCOME_RATIO, ratio_column(credit, income)),
            (columns::ANNUITY_INCOME_RATIO, ratio_column(annuity, income)),
            (columns::CREDIT_TERM, ratio_column(annuity, credit)),
            (
                columns::AGE_YEARS,
                days_birth
                    .par_iter()
                    .map(|days| safe_ratio(*days, Some(DAYS_PER_YEAR)))
                    .collect(),
            ),
        ];

        if self.options.household_features {
            let members = table.numeric(columns::CNT_FAM_MEMBERS)?;
            let days_employed = table.numeric(columns::DAYS_EMPLOYED)?;
            derived.push((columns::INCOME_PER_PERSON, ratio_column(income, members)));
            derived.push((
                columns::DAYS_EMPLOYED_PERCENT,
                ratio_column(days_employed, days_birth),
            ));
        }

        let mut output = table.clone();
        for (name, values) in derived {
            output.upsert_numeric(name, values)?;
        }
        Ok(output)
    }
}

/// `numerator / denominator`, or missing when either side is missing, the
/// denominator is zero, or the quotient is not finite.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (numerator, denominator) = (numerator?, denominator?);
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

fn ratio_column(numerator: &[Option<f64>], denominator: &[Option<f64>]) -> Vec<Option<f64>> {
    numerator
        .par_iter()
        .zip(denominator.par_iter())
        .map(|(num, den)| safe_ratio(*num, *den))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::features::domain::ApplicantRecord;
    use crate::workflows::features::table::Column;

    fn applicant(credit: f64, income: f64, annuity: f64, days_birth: f64) -> ApplicantRecord {
        ApplicantRecord {
            days_birth: Some(days_birth),
            days_employed: Some(-2000.0),
            amt_credit: Some(credit),
            amt_income_total: Some(income),
            amt_annuity: Some(annuity),
            cnt_fam_members: Some(2.0),
            ..ApplicantRecord::default()
        }
    }

    #[test]
    fn computes_domain_ratios() {
        let table = FeatureTable::from_records(&[
            applicant(100000.0, 50000.0, 5000.0, 10000.0),
            applicant(200000.0, 100000.0, 10000.0, 15000.0),
        ]);

        let derived = FeatureDeriver::default().derive(&table).expect("columns present");

        let credit_income = derived.numeric(columns::CREDIT_INCOME_RATIO).expect("column");
        assert_eq!(credit_income, &[Some(2.0), Some(2.0)]);
        let annuity_income = derived.numeric(columns::ANNUITY_INCOME_RATIO).expect("column");
        assert_eq!(annuity_income[0], Some(0.1));
        let term = derived.numeric(columns::CREDIT_TERM).expect("column");
        assert_eq!(term[0], Some(0.05));

        let age = derived.numeric(columns::AGE_YEARS).expect("column")[0].expect("age");
        let expected = 10000.0 / 365.0;
        assert!(((age - expected) / expected).abs() < 1e-2);
    }

    #[test]
    fn zero_or_missing_denominator_yields_missing() {
        let mut missing_income = applicant(100000.0, 0.0, 5000.0, 10000.0);
        missing_income.amt_income_total = None;
        let table = FeatureTable::from_records(&[
            applicant(100000.0, 0.0, 5000.0, 10000.0),
            missing_income,
            applicant(0.0, 50000.0, 5000.0, 10000.0),
        ]);

        let derived = FeatureDeriver::default().derive(&table).expect("columns present");

        assert_eq!(
            derived.numeric(columns::CREDIT_INCOME_RATIO).expect("column"),
            &[None, None, Some(0.0)]
        );
        assert_eq!(
            derived.numeric(columns::CREDIT_TERM).expect("column"),
            &[Some(0.05), Some(0.05), None]
        );
    }

    #[test]
    fn safe_ratio_never_returns_non_finite_values() {
        assert_eq!(safe_ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(safe_ratio(Some(0.0), Some(-0.0)), None);
        assert_eq!(safe_ratio(None, Some(2.0)), None);
        assert_eq!(safe_ratio(Some(f64::INFINITY), Some(2.0)), None);
        assert_eq!(safe_ratio(Some(f64::MAX), Some(1e-300)), None);
        assert_eq!(safe_ratio(Some(3.0), Some(2.0)), Some(1.5));
    }

    #[test]
    fn derivation_ignores_target_and_keeps_rows() {
        let mut rows = vec![applicant(1.0, 2.0, 3.0, 4.0); 3];
        rows[1].target = Some(1);
        let table = FeatureTable::from_records(&rows);

        let derived = FeatureDeriver::default().derive(&table).expect("columns present");

        assert_eq!(derived.row_count(), 3);
        assert_eq!(
            derived.numeric(columns::TARGET).expect("target"),
            &[None, Some(1.0), None]
        );
        assert_eq!(
            derived.numeric(columns::CREDIT_INCOME_RATIO).expect("column"),
            &[Some(0.5), Some(0.5), Some(0.5)]
        );
    }

    #[test]
    fn household_features_are_opt_in() {
        let table = FeatureTable::from_records(&[applicant(100000.0, 50000.0, 5000.0, 10000.0)]);

        let default = FeatureDeriver::default().derive(&table).expect("derive");
        assert!(!default.contains(columns::INCOME_PER_PERSON));

        let extended = FeatureDeriver::new(DerivationOptions {
            household_features: true,
        })
        .derive(&table)
        .expect("derive");
        assert_eq!(
            extended.numeric(columns::INCOME_PER_PERSON).expect("column"),
            &[Some(25000.0)]
        );
        assert_eq!(
            extended.numeric(columns::DAYS_EMPLOYED_PERCENT).expect("column"),
            &[Some(-0.2)]
        );
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let derived = FeatureDeriver::default()
            .derive(&FeatureTable::from_records(&[]))
            .expect("derive");
        assert_eq!(derived.row_count(), 0);
        assert!(derived.contains(columns::AGE_YEARS));
    }

    #[test]
    fn missing_source_column_is_a_schema_error() {
        let table = FeatureTable::from_columns(vec![
            Column::numeric(columns::AMT_CREDIT, vec![Some(1.0)]),
            Column::numeric(columns::AMT_INCOME_TOTAL, vec![Some(1.0)]),
            Column::numeric(columns::DAYS_BIRTH, vec![Some(1.0)]),
        ])
        .expect("valid");

        assert_eq!(
            FeatureDeriver::default().derive(&table).expect_err("schema"),
            SchemaError::MissingColumn(columns::AMT_ANNUITY.to_string())
        );
    }
}
