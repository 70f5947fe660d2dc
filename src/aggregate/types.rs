//! Derived values handed to the presentation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::nutrients::{Nutrient, NutrientValues};

/// Inclusive range of calendar dates. A range whose `start` is after its
/// `end` contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Sum of every nutrient across the records of one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub nutrients: NutrientValues,
}

/// Mean of the daily totals in a range. `days` is the number of dates that
/// had at least one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageProfile {
    pub days: usize,
    pub nutrients: NutrientValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contributor {
    pub item_name: String,
    pub amount: f64,
}

/// Items ordered by how much of `nutrient` they contributed over `range`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorRanking {
    pub nutrient: Nutrient,
    pub range: DateRange,
    pub entries: Vec<Contributor>,
}
