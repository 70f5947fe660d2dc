//! Composes aggregator outputs into what the dashboard displays.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    AverageProfile, ContributorRanking, DailyTotal, DateRange, average_profile, daily_totals,
    intake_delta, today_summary, top_contributors,
};
use crate::nutrients::{Nutrient, NutrientValues};
use crate::record::NutritionRecord;
use crate::snapshot::Session;

/// Rows shown in the contributor table unless asked otherwise.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// User-selectable filters. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub nutrient: Option<Nutrient>,
    pub limit: Option<usize>,
}

impl DashboardQuery {
    /// The filter range, with missing bounds taken from the loaded table.
    /// `None` when the table is empty and no bound was given.
    pub fn range(&self, session: &Session) -> Option<DateRange> {
        let extent = session.snapshot.extent();
        let start = self.start.or(extent.map(|r| r.start))?;
        let end = self.end.or(extent.map(|r| r.end))?;
        Some(DateRange::new(start, end))
    }

    pub fn nutrient(&self) -> Nutrient {
        self.nutrient.unwrap_or(Nutrient::Calories)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT)
    }
}

/// Today's intake and how it compares to the average over the range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayCard {
    pub reference_time: DateTime<FixedOffset>,
    pub total: DailyTotal,
    pub delta: NutrientValues,
}

impl TodayCard {
    /// Only records inside `range` count towards today. A range that excludes
    /// today, or no range at all, gives an all-zero total.
    pub fn within(
        records: &[NutritionRecord],
        range: Option<&DateRange>,
        average: &AverageProfile,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let counted: &[NutritionRecord] = match range {
            Some(r) if r.contains(now.date_naive()) => records,
            _ => &[],
        };
        let total = today_summary(counted, &now);

        TodayCard {
            reference_time: now,
            delta: intake_delta(&total, average),
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One nutrient's daily series plus the average line drawn across it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientTrend {
    pub nutrient: Nutrient,
    pub unit: &'static str,
    pub points: Vec<TrendPoint>,
    pub average: f64,
}

impl NutrientTrend {
    pub fn from_totals(nutrient: Nutrient, totals: &[DailyTotal], average: &AverageProfile) -> Self {
        Self {
            nutrient,
            unit: nutrient.unit(),
            points: totals
                .iter()
                .map(|t| TrendPoint {
                    date: t.date,
                    value: t.nutrients[nutrient],
                })
                .collect(),
            average: average.nutrients[nutrient],
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub source: String,
    pub notice: Option<String>,
    pub range: Option<DateRange>,
    pub today: TodayCard,
    pub average: AverageProfile,
    pub daily: Vec<DailyTotal>,
    pub trends: Vec<NutrientTrend>,
    pub top: Option<ContributorRanking>,
    pub rejected_rows: usize,
}

impl DashboardView {
    pub fn build(session: &Session, query: &DashboardQuery, now: DateTime<FixedOffset>) -> Self {
        let records = session.snapshot.records();
        let range = query.range(session);

        let daily = range
            .map(|r| daily_totals(records, &r))
            .unwrap_or_default();
        let average = average_profile(&daily);

        let today = TodayCard::within(records, range.as_ref(), &average, now);

        let trends = Nutrient::HEADLINE
            .into_iter()
            .map(|n| NutrientTrend::from_totals(n, &daily, &average))
            .collect();

        let top = range.map(|r| top_contributors(records, query.nutrient(), &r, query.limit()));

        DashboardView {
            source: session.snapshot.source_name().to_string(),
            notice: session.notice.clone(),
            range,
            today,
            average,
            daily,
            trends,
            top,
            rejected_rows: session.snapshot.rejected().len(),
        }
    }
}
