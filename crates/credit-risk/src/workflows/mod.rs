pub mod datasets;
pub mod decision;
pub mod error;
pub mod features;

pub use error::{RiskError, SchemaError};
