use chrono::FixedOffset;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::mapping::ColumnMapping;
use super::row::{Cell, normalize_row};
use super::{DataSource, LoadReport};
use crate::error::DashboardError;
use crate::nutrients::Nutrient;

/// Reads the spreadsheet CSV export from disk.
pub struct CsvSource {
    path: PathBuf,
    mapping: ColumnMapping,
    zone: FixedOffset,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, mapping: ColumnMapping, zone: FixedOffset) -> Self {
        Self {
            path: path.into(),
            mapping,
            zone,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl DataSource for CsvSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<LoadReport, DashboardError> {
        let file = File::open(&self.path).map_err(|e| DashboardError::unavailable(self.name(), e))?;
        read_records(&self.name(), file, &self.mapping, &self.zone)
    }
}

/// Header positions of the mapped columns, resolved once per load.
struct ResolvedColumns {
    date: usize,
    item_name: usize,
    nutrients: Vec<(Nutrient, Option<usize>)>,
}

impl ResolvedColumns {
    fn resolve(
        source_name: &str,
        headers: &StringRecord,
        mapping: &ColumnMapping,
    ) -> Result<Self, DashboardError> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        let required = |column: &str| {
            find(column).ok_or_else(|| {
                DashboardError::unavailable(source_name, format!("missing required column '{column}'"))
            })
        };

        let date = required(mapping.date())?;
        let item_name = required(mapping.item_name())?;

        let nutrients = Nutrient::ALL
            .into_iter()
            .map(|n| {
                let idx = find(mapping.nutrient(n));
                if idx.is_none() {
                    warn!(nutrient = %n, column = mapping.nutrient(n), "Nutrient column absent, treating as zero");
                }
                (n, idx)
            })
            .collect();

        Ok(Self {
            date,
            item_name,
            nutrients,
        })
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Cell<'_> {
    idx.and_then(|i| record.get(i)).map_or(Cell::Missing, Cell::Text)
}

/// Reads CSV rows from any reader. Row numbers in errors are 1-based and
/// exclude the header.
pub fn read_records<R: Read>(
    source_name: &str,
    reader: R,
    mapping: &ColumnMapping,
    zone: &FixedOffset,
) -> Result<LoadReport, DashboardError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::unavailable(source_name, e))?
        .clone();
    let columns = ResolvedColumns::resolve(source_name, &headers, mapping)?;

    let mut report = LoadReport::default();

    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let parsed = match result {
            Ok(record) => normalize_row(
                row,
                cell(&record, Some(columns.date)),
                cell(&record, Some(columns.item_name)),
                columns.nutrients.iter().map(|&(n, i)| (n, cell(&record, i))),
                zone,
            ),
            Err(e) => Err(DashboardError::data_format(row, e.to_string())),
        };
        report.push(parsed);
    }

    debug!(
        accepted = report.records.len(),
        rejected = report.rejected.len(),
        "CSV rows read"
    );
    info!(source = source_name, records = report.records.len(), "Loaded nutrition table");

    Ok(report)
}
