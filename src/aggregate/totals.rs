use chrono::{DateTime, TimeZone};
use std::collections::BTreeMap;

use crate::aggregate::types::{AverageProfile, DailyTotal, DateRange};
use crate::nutrients::NutrientValues;
use crate::record::NutritionRecord;

/// Records whose date falls inside `range`, in their original order.
pub fn filter_range<'a>(
    records: &'a [NutritionRecord],
    range: &DateRange,
) -> impl Iterator<Item = &'a NutritionRecord> + 'a {
    let range = *range;
    records.iter().filter(move |r| range.contains(r.date))
}

/// Buckets records by date and sums every nutrient per bucket.
///
/// Output is ascending by date and sparse: dates without records are omitted
/// rather than zero-filled.
pub fn daily_totals(records: &[NutritionRecord], range: &DateRange) -> Vec<DailyTotal> {
    let mut buckets: BTreeMap<_, NutrientValues> = BTreeMap::new();

    for record in filter_range(records, range) {
        *buckets.entry(record.date).or_default() += &record.nutrients;
    }

    buckets
        .into_iter()
        .map(|(date, nutrients)| DailyTotal { date, nutrients })
        .collect()
}

/// Per-nutrient mean of the given daily totals. Empty input yields zeros.
pub fn average_profile(daily_totals: &[DailyTotal]) -> AverageProfile {
    let days = daily_totals.len();
    if days == 0 {
        return AverageProfile {
            days,
            nutrients: NutrientValues::zero(),
        };
    }

    let mut sum = NutrientValues::zero();
    for total in daily_totals {
        sum += &total.nutrients;
    }

    AverageProfile {
        days,
        nutrients: sum.map(|v| v / days as f64),
    }
}

/// Total intake for the calendar day containing `now`, evaluated in `now`'s
/// own timezone rather than the host's.
///
/// Returns an all-zero total when nothing was logged that day.
pub fn today_summary<Tz: TimeZone>(records: &[NutritionRecord], now: &DateTime<Tz>) -> DailyTotal {
    let today = now.date_naive();

    daily_totals(records, &DateRange::single(today))
        .pop()
        .unwrap_or(DailyTotal {
            date: today,
            nutrients: NutrientValues::zero(),
        })
}

/// How far today's intake is above (positive) or below the average.
pub fn intake_delta(today: &DailyTotal, average: &AverageProfile) -> NutrientValues {
    today.nutrients.minus(&average.nutrients)
}
