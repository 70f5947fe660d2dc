use std::collections::{BTreeMap, HashMap};

use crate::nutrients::Nutrient;

/// A field of [`NutritionRecord`](crate::record::NutritionRecord) that a
/// source column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Date,
    ItemName,
    Nutrient(Nutrient),
}

impl Field {
    /// Key used in column override files.
    pub fn key(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::ItemName => "item_name",
            Field::Nutrient(n) => n.key(),
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        match key {
            "date" => Some(Field::Date),
            "item_name" => Some(Field::ItemName),
            other => other.parse().ok().map(Field::Nutrient),
        }
    }
}

/// Canonical field → source column name, fixed per source variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<Field, String>,
}

impl ColumnMapping {
    fn with_names(date: &str, item_name: &str) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(Field::Date, date.to_string());
        columns.insert(Field::ItemName, item_name.to_string());
        for n in Nutrient::ALL {
            columns.insert(Field::Nutrient(n), n.column_label());
        }
        Self { columns }
    }

    /// Column names of the spreadsheet CSV export.
    pub fn csv() -> Self {
        Self::with_names("Input Date", "Item Name")
    }

    /// Column names of the Airtable table, which calls the item "Food Name".
    pub fn airtable() -> Self {
        Self::with_names("Input Date", "Food Name")
    }

    /// Replaces the column names of the fields present in `overrides`.
    pub fn with_overrides(mut self, overrides: &HashMap<Field, String>) -> Self {
        for (field, column) in overrides {
            self.columns.insert(*field, column.clone());
        }
        self
    }

    pub fn column(&self, field: Field) -> &str {
        self.columns.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.column(Field::Date)
    }

    pub fn item_name(&self) -> &str {
        self.column(Field::ItemName)
    }

    pub fn nutrient(&self, nutrient: Nutrient) -> &str {
        self.column(Field::Nutrient(nutrient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_differ_only_in_item_column() {
        let csv = ColumnMapping::csv();
        let airtable = ColumnMapping::airtable();

        assert_eq!(csv.item_name(), "Item Name");
        assert_eq!(airtable.item_name(), "Food Name");
        assert_eq!(csv.date(), airtable.date());
        for n in Nutrient::ALL {
            assert_eq!(csv.nutrient(n), airtable.nutrient(n));
        }
        assert_eq!(csv.nutrient(Nutrient::Omega3), "Omega-3 (mg)");
    }

    #[test]
    fn test_overrides_replace_only_named_fields() {
        let mut overrides = HashMap::new();
        overrides.insert(Field::Nutrient(Nutrient::Protein), "Protein".to_string());
        overrides.insert(Field::Date, "Logged At".to_string());

        let mapping = ColumnMapping::airtable().with_overrides(&overrides);

        assert_eq!(mapping.nutrient(Nutrient::Protein), "Protein");
        assert_eq!(mapping.date(), "Logged At");
        assert_eq!(mapping.item_name(), "Food Name");
        assert_eq!(mapping.nutrient(Nutrient::Fat), "Fat (g)");
    }

    #[test]
    fn test_field_keys_round_trip() {
        assert_eq!(Field::from_key("date"), Some(Field::Date));
        assert_eq!(Field::from_key("item_name"), Some(Field::ItemName));
        assert_eq!(
            Field::from_key("saturated_fat"),
            Some(Field::Nutrient(Nutrient::SaturatedFat))
        );
        assert_eq!(Field::from_key("photo"), None);
        assert_eq!(Field::Nutrient(Nutrient::Omega3).key(), "omega_3");
    }
}
