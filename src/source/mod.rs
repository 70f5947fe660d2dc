//! Data source adapters.
//!
//! A [`DataSource`] reads a tabular snapshot of food-intake rows and
//! normalizes it into [`NutritionRecord`]s through a [`ColumnMapping`].
//! Malformed rows are rejected individually; only an unreadable source fails
//! the whole load.

pub mod airtable;
pub mod csv_file;
pub mod mapping;
pub mod row;

pub use airtable::{AirtableCredentials, AirtableSource};
pub use csv_file::CsvSource;
pub use mapping::{ColumnMapping, Field};

use tracing::warn;

use crate::error::DashboardError;
use crate::record::NutritionRecord;

/// Records that passed validation plus the rows that did not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<NutritionRecord>,
    pub rejected: Vec<DashboardError>,
}

impl LoadReport {
    /// Keeps a valid row or logs and keeps the rejection.
    pub(crate) fn push(&mut self, result: Result<NutritionRecord, DashboardError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed row");
                self.rejected.push(e);
            }
        }
    }
}

/// Abstraction over where the nutrition table lives.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable description used in logs and notices.
    fn name(&self) -> String;

    /// Reads the full table.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::SourceUnavailable`] if the source cannot be
    /// read at all. Per-row problems are reported in [`LoadReport::rejected`].
    async fn load(&self) -> Result<LoadReport, DashboardError>;
}
