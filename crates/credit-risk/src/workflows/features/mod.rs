//! Applicant cleaning and feature engineering.
//!
//! raw table -> [`RecordCleaner`] -> [`FeatureDeriver`] -> sanitation, all
//! orchestrated by [`FeatureAssembler`]. [`ModelMatrix`] turns the engineered
//! table into the numeric layout a scoring model consumes.

pub mod assembler;
pub mod cleaner;
pub mod deriver;
pub mod domain;
pub mod matrix;
pub mod sanitize;
pub mod table;

pub use assembler::{AssembledFeatures, AssemblyReport, FeatureAssembler};
pub use cleaner::{CleaningReport, RecordCleaner};
pub use deriver::{safe_ratio, DerivationOptions, FeatureDeriver};
pub use domain::{columns, ApplicantRecord, DAYS_EMPLOYED_SENTINEL, REQUIRED_COLUMNS};
pub use matrix::{labels_from_cells, ModelMatrix};
pub use sanitize::{is_finite_or_missing, sanitize_non_finite, SanitationReport};
pub use table::{Column, ColumnValues, FeatureTable};
