use chrono::NaiveDate;
use serde::Serialize;

use crate::nutrients::NutrientValues;

/// One logged food item. Produced by a data source after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionRecord {
    pub date: NaiveDate,
    pub item_name: String,
    pub nutrients: NutrientValues,
}

impl NutritionRecord {
    pub fn new(date: NaiveDate, item_name: impl Into<String>, nutrients: NutrientValues) -> Self {
        Self {
            date,
            item_name: item_name.into(),
            nutrients,
        }
    }
}
