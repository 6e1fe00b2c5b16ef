//! Unified error type for PV plant configuration and analysis.
//!
//! Every fallible operation in the workspace returns [`PlantResult`]. The
//! variants follow the failure classes of the configuration pipeline:
//! form validation, unit conversion of equipment records, collaborator
//! lookups and statistic inputs.
//!
//! ```
//! use pvplant_core::{PlantError, PlantResult};
//!
//! fn subarrays(count: u32) -> PlantResult<u32> {
//!     if count == 0 {
//!         return Err(PlantError::Configuration("at least one subarray is required".into()));
//!     }
//!     Ok(count)
//! }
//! assert!(subarrays(0).is_err());
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantError {
    /// Cardinality mismatch, missing required field or out-of-range form value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An equipment record lacks a usable value needed for a derived unit
    #[error("Unit conversion error: {0}")]
    UnitConversion(String),

    /// Equipment database, remote service or vendor file could not supply a record
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Statistic input cannot produce a distribution
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding of JSON, TOML or CSV content
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type PlantResult<T> = Result<T, PlantError>;

impl PlantError {
    pub fn missing_field(schema: &str, field: &str) -> Self {
        PlantError::Configuration(format!("{schema} record is missing field '{field}'"))
    }
}

impl From<serde_json::Error> for PlantError {
    fn from(err: serde_json::Error) -> Self {
        PlantError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlantError::InvalidSample("need at least 2 samples".into());
        assert!(err.to_string().contains("Invalid sample"));
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_missing_field_message() {
        let err = PlantError::missing_field("cec_module", "I_sc_ref");
        assert!(matches!(err, PlantError::Configuration(_)));
        assert!(err.to_string().contains("'I_sc_ref'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlantError = io_err.into();
        assert!(matches!(err, PlantError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> PlantResult<()> {
            Err(PlantError::Lookup("no such inverter".into()))
        }

        fn outer() -> PlantResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(PlantError::Lookup(_))));
    }
}
