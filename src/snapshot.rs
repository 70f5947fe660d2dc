//! The nutrition table loaded for a session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregate::DateRange;
use crate::error::DashboardError;
use crate::record::NutritionRecord;
use crate::source::{DataSource, LoadReport};

/// An immutable, cheaply clonable view of every record read from a source.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Arc<[NutritionRecord]>,
    rejected: Arc<[DashboardError]>,
    source_name: String,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(source_name: impl Into<String>, report: LoadReport, loaded_at: DateTime<Utc>) -> Self {
        Self {
            records: report.records.into(),
            rejected: report.rejected.into(),
            source_name: source_name.into(),
            loaded_at,
        }
    }

    pub fn empty(source_name: impl Into<String>, loaded_at: DateTime<Utc>) -> Self {
        Self::new(source_name, LoadReport::default(), loaded_at)
    }

    pub fn records(&self) -> &[NutritionRecord] {
        &self.records
    }

    pub fn rejected(&self) -> &[DashboardError] {
        &self.rejected
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// First to last logged date, or `None` for an empty table.
    pub fn extent(&self) -> Option<DateRange> {
        let start = self.records.iter().map(|r| r.date).min()?;
        let end = self.records.iter().map(|r| r.date).max()?;
        Some(DateRange::new(start, end))
    }
}

/// Snapshot plus the notice to show when the source could not be read.
#[derive(Debug, Clone)]
pub struct Session {
    pub snapshot: Snapshot,
    pub notice: Option<String>,
}

impl Session {
    /// Loads the table once. An unreadable source yields an empty snapshot
    /// and a notice instead of an error.
    #[tracing::instrument(skip_all, fields(source = %source.name()))]
    pub async fn open(source: &dyn DataSource, loaded_at: DateTime<Utc>) -> Session {
        match source.load().await {
            Ok(report) => {
                info!(
                    records = report.records.len(),
                    rejected = report.rejected.len(),
                    "Session snapshot ready"
                );
                Session {
                    snapshot: Snapshot::new(source.name(), report, loaded_at),
                    notice: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Data source unavailable, starting with an empty table");
                Session {
                    snapshot: Snapshot::empty(source.name(), loaded_at),
                    notice: Some(e.to_string()),
                }
            }
        }
    }
}

/// Summary of the loaded table, for health checks.
#[derive(Debug, Serialize)]
pub struct SnapshotInfo {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub records: usize,
    pub rejected_rows: usize,
    pub extent: Option<DateRange>,
}

impl From<&Snapshot> for SnapshotInfo {
    fn from(snapshot: &Snapshot) -> Self {
        SnapshotInfo {
            source: snapshot.source_name.clone(),
            loaded_at: snapshot.loaded_at,
            records: snapshot.records.len(),
            rejected_rows: snapshot.rejected.len(),
            extent: snapshot.extent(),
        }
    }
}
