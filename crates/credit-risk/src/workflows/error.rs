//! Error taxonomy shared by the feature pipeline and the decision layer.
//!
//! Every variant aborts the affected batch. Schema problems are table-wide, so
//! there is no row-level partial success.

/// Missing or malformed columns.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("required column `{0}` is absent")]
    MissingColumn(String),
    #[error("column `{0}` is not numeric")]
    NotNumeric(String),
    #[error("column `{0}` appears more than once")]
    DuplicateColumn(String),
    #[error("column `{column}` has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("{left} has {left_len} entries but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },
    #[error("chunk {chunk} does not share the column layout of the first chunk")]
    IncompatibleChunk { chunk: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("label {value} at row {row} is not 0 or 1")]
    InvalidLabel { row: usize, value: f64 },
    #[error("{operation} needs at least one observation")]
    InsufficientData { operation: &'static str },
}

impl RiskError {
    pub(crate) fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
