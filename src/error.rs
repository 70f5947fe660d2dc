//! Errors raised while loading nutrition data.
//!
//! Aggregation itself never fails; both variants originate at the data source
//! boundary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The file or remote table could not be read at all. The dashboard falls
    /// back to an empty state and shows `reason` as a notice.
    #[error("data source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A single row is malformed. It is excluded and loading continues.
    #[error("row {row}: {reason}")]
    DataFormat { row: usize, reason: String },
}

impl DashboardError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn data_format(row: usize, reason: impl Into<String>) -> Self {
        DashboardError::DataFormat {
            row,
            reason: reason.into(),
        }
    }
}
