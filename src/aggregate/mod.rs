//! Date bucketing and per-nutrient aggregation.
//!
//! Every function here is pure and total over validated records: empty input
//! produces zero or empty output, never an error.

pub mod ranking;
pub mod totals;
pub mod types;

pub use ranking::top_contributors;
pub use totals::{average_profile, daily_totals, filter_range, intake_delta, today_summary};
pub use types::{AverageProfile, Contributor, ContributorRanking, DailyTotal, DateRange};
