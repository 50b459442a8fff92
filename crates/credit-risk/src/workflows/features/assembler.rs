use serde::Serialize;
use tracing::{debug, warn};

use super::cleaner::{CleaningReport, RecordCleaner};
use super::deriver::{DerivationOptions, FeatureDeriver};
use super::domain::REQUIRED_COLUMNS;
use super::sanitize::{sanitize_non_finite, SanitationReport};
use super::table::FeatureTable;
use crate::workflows::error::SchemaError;

/// What assembly changed, so callers can count or log automatic recoveries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub rows: usize,
    pub cleaning: CleaningReport,
    pub sanitation: SanitationReport,
}

impl AssemblyReport {
    pub fn merge(&mut self, other: &AssemblyReport) {
        self.rows += other.rows;
        self.cleaning.merge(&other.cleaning);
        self.sanitation.merge(&other.sanitation);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFeatures {
    pub table: FeatureTable,
    pub report: AssemblyReport,
}

/// Clean, derive, then sanitize. The only stage that guarantees no infinite
/// value leaves the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler {
    cleaner: RecordCleaner,
    deriver: FeatureDeriver,
}

impl FeatureAssembler {
    pub fn new(options: DerivationOptions) -> Self {
        Self {
            cleaner: RecordCleaner,
            deriver: FeatureDeriver::new(options),
        }
    }

    pub fn deriver(&self) -> &FeatureDeriver {
        &self.deriver
    }

    /// Row count and row order of `raw` are preserved. Running this again on
    /// its own output yields the same table, since derived columns are
    /// recomputed in place from the cleaned sources.
    pub fn assemble(&self, raw: &FeatureTable) -> Result<AssembledFeatures, SchemaError> {
        raw.require(&REQUIRED_COLUMNS)?;

        let (cleaned, cleaning) = self.cleaner.clean(raw)?;
        debug!(
            rows = cleaning.rows,
            sign_flips = cleaning.days_birth_sign_flips,
            sentinels = cleaning.days_employed_sentinels,
            "cleaned application records"
        );

        let mut table = self.deriver.derive(&cleaned)?;
        debug!(
            columns = ?self.deriver.derived_columns(),
            "derived domain features"
        );

        let sanitation = sanitize_non_finite(&mut table);
        if !sanitation.is_clean() {
            warn!(
                replaced = sanitation.total(),
                by_column = ?sanitation.replaced_by_column,
                "replaced non-finite values with missing"
            );
        }

        Ok(AssembledFeatures {
            report: AssemblyReport {
                rows: table.row_count(),
                cleaning,
                sanitation,
            },
            table,
        })
    }

    /// Assemble chunk by chunk; the result equals a single pass over the
    /// concatenated input. No chunks at all yields the empty engineered layout.
    pub fn assemble_chunks<I>(&self, chunks: I) -> Result<AssembledFeatures, SchemaError>
    where
        I: IntoIterator<Item = FeatureTable>,
    {
        let mut tables = Vec::new();
        let mut report = AssemblyReport::default();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let assembled = self.assemble(&chunk)?;
            debug!(chunk = index, rows = assembled.report.rows, "assembled chunk");
            report.merge(&assembled.report);
            tables.push(assembled.table);
        }

        if tables.is_empty() {
            return self.assemble(&FeatureTable::from_records(&[]));
        }

        Ok(AssembledFeatures {
            table: FeatureTable::concat(tables)?,
            report,
        })
    }
}
