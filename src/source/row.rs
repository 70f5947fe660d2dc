//! Turns one raw source row into a validated [`NutritionRecord`].

use chrono::FixedOffset;

use crate::error::DashboardError;
use crate::nutrients::{Nutrient, NutrientValues};
use crate::parser::{check_amount, parse_amount, parse_date};
use crate::record::NutritionRecord;

/// A single cell as delivered by a source, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    /// Present but of a shape no field accepts (e.g. a JSON array).
    Unsupported,
}

impl<'a> Cell<'a> {
    pub fn from_json(value: Option<&'a serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Cell::Missing,
            Some(serde_json::Value::String(s)) => Cell::Text(s),
            Some(serde_json::Value::Number(n)) => n.as_f64().map_or(Cell::Unsupported, Cell::Number),
            Some(_) => Cell::Unsupported,
        }
    }
}

/// Validates one row.
///
/// `row` is only used to label errors. Missing nutrient cells count as zero;
/// the date and item name are required.
pub fn normalize_row<'a>(
    row: usize,
    date: Cell<'a>,
    item_name: Cell<'a>,
    amounts: impl IntoIterator<Item = (Nutrient, Cell<'a>)>,
    zone: &FixedOffset,
) -> Result<NutritionRecord, DashboardError> {
    let date = match date {
        Cell::Text(raw) => parse_date(raw, zone)
            .ok_or_else(|| DashboardError::data_format(row, format!("unparseable date '{raw}'")))?,
        Cell::Missing => return Err(DashboardError::data_format(row, "missing date")),
        _ => return Err(DashboardError::data_format(row, "date is not text")),
    };

    let item_name = match item_name {
        Cell::Text(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::Text(_) | Cell::Missing => {
            return Err(DashboardError::data_format(row, "missing item name"));
        }
        Cell::Unsupported => return Err(DashboardError::data_format(row, "item name is not text")),
    };

    let mut nutrients = NutrientValues::zero();
    for (nutrient, cell) in amounts {
        let amount = match cell {
            Cell::Missing => Ok(0.0),
            Cell::Text(raw) => parse_amount(raw),
            Cell::Number(n) => check_amount(n),
            Cell::Unsupported => Err("value is not a number".to_string()),
        }
        .map_err(|reason| DashboardError::data_format(row, format!("{nutrient}: {reason}")))?;

        nutrients.set(nutrient, amount);
    }

    Ok(NutritionRecord {
        date,
        item_name,
        nutrients,
    })
}
