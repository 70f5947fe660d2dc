use std::collections::HashMap;

use crate::aggregate::totals::filter_range;
use crate::aggregate::types::{Contributor, ContributorRanking, DateRange};
use crate::nutrients::Nutrient;
use crate::record::NutritionRecord;

/// Ranks items by their summed amount of `nutrient` within `range`.
///
/// Sorted descending by amount; equal amounts are ordered by item name so the
/// output is deterministic. At most `limit` entries are returned.
pub fn top_contributors(
    records: &[NutritionRecord],
    nutrient: Nutrient,
    range: &DateRange,
    limit: usize,
) -> ContributorRanking {
    let mut by_item: HashMap<&str, f64> = HashMap::new();

    for record in filter_range(records, range) {
        *by_item.entry(record.item_name.as_str()).or_default() += record.nutrients[nutrient];
    }

    let mut entries: Vec<Contributor> = by_item
        .into_iter()
        .map(|(item_name, amount)| Contributor {
            item_name: item_name.to_string(),
            amount,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    entries.truncate(limit);

    ContributorRanking {
        nutrient,
        range: *range,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::NutrientValues;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rec(date: &str, item: &str, calories: f64, protein: f64) -> NutritionRecord {
        NutritionRecord::new(
            d(date),
            item,
            NutrientValues::zero()
                .with(Nutrient::Calories, calories)
                .with(Nutrient::Protein, protein),
        )
    }

    fn scenario() -> Vec<NutritionRecord> {
        vec![
            rec("2024-01-01", "Rice", 200.0, 4.0),
            rec("2024-01-01", "Egg", 70.0, 6.0),
            rec("2024-01-02", "Rice", 200.0, 4.0),
        ]
    }

    fn full_range() -> DateRange {
        DateRange::new(d("2024-01-01"), d("2024-01-02"))
    }

    fn names(ranking: &ContributorRanking) -> Vec<&str> {
        ranking.entries.iter().map(|c| c.item_name.as_str()).collect()
    }

    #[test]
    fn test_top_calories_limit_one() {
        let ranking = top_contributors(&scenario(), Nutrient::Calories, &full_range(), 1);

        assert_eq!(
            ranking.entries,
            vec![Contributor {
                item_name: "Rice".to_string(),
                amount: 400.0
            }]
        );
        assert_eq!(ranking.nutrient, Nutrient::Calories);
    }

    #[test]
    fn test_ties_break_by_name() {
        let mut records = scenario();
        records.push(rec("2024-01-02", "Egg", 70.0, 2.0));

        // Rice and Egg both contribute 8g of protein over the full range.
        let ranking = top_contributors(&records, Nutrient::Protein, &full_range(), 10);

        assert_eq!(names(&ranking), vec!["Egg", "Rice"]);
        assert_eq!(ranking.entries[0].amount, 8.0);
        assert_eq!(ranking.entries[1].amount, 8.0);
    }

    #[test]
    fn test_sorted_descending_and_bounded() {
        let records = vec![
            rec("2024-01-01", "Apple", 95.0, 0.5),
            rec("2024-01-01", "Banana", 105.0, 1.3),
            rec("2024-01-01", "Cherry", 95.0, 1.0),
            rec("2024-01-01", "Date", 20.0, 0.2),
        ];

        let ranking = top_contributors(&records, Nutrient::Calories, &full_range(), 3);

        assert_eq!(names(&ranking), vec!["Banana", "Apple", "Cherry"]);
        assert!(
            ranking
                .entries
                .windows(2)
                .all(|w| w[0].amount >= w[1].amount)
        );
    }

    #[test]
    fn test_restricted_to_range() {
        let ranking = top_contributors(
            &scenario(),
            Nutrient::Calories,
            &DateRange::single(d("2024-01-02")),
            10,
        );

        assert_eq!(names(&ranking), vec!["Rice"]);
        assert_eq!(ranking.entries[0].amount, 200.0);
    }

    #[test]
    fn test_empty_input() {
        let ranking = top_contributors(&[], Nutrient::Fiber, &full_range(), 10);
        assert!(ranking.entries.is_empty());
    }
}
