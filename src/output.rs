//! Command-line rendering of derived values.
//!
//! Supports pretty JSON logging, a ranked listing and CSV tables on any writer.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

use crate::aggregate::{ContributorRanking, DailyTotal};
use crate::nutrients::Nutrient;

/// Logs any derived value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs one line per ranked item.
pub fn print_ranking(ranking: &ContributorRanking) {
    let nutrient = ranking.nutrient;
    info!(
        nutrient = %nutrient,
        start = %ranking.range.start,
        end = %ranking.range.end,
        items = ranking.entries.len(),
        "Top contributors"
    );
    for (rank, entry) in ranking.entries.iter().enumerate() {
        info!(
            rank = rank + 1,
            item = %entry.item_name,
            amount = entry.amount,
            unit = nutrient.unit(),
            "Contributor"
        );
    }
}

/// Writes daily totals as a CSV table headed like the source export
/// (`Date,Calories (kcal),Protein (g),...`).
pub fn write_daily_csv<W: Write>(writer: W, totals: &[DailyTotal]) -> Result<()> {
    debug!(rows = totals.len(), "Writing daily totals CSV");

    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["Date".to_string()];
    header.extend(Nutrient::ALL.iter().map(|n| n.column_label()));
    writer.write_record(&header)?;

    for total in totals {
        let mut row = vec![total.date.to_string()];
        row.extend(total.nutrients.iter().map(|(_, v)| v.to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
