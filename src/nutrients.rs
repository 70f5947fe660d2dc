//! The closed set of tracked nutrients and a dense per-nutrient value table.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{AddAssign, Index, IndexMut};
use std::str::FromStr;

/// A tracked dietary quantity.
///
/// Serializes as its key; deserializes through [`FromStr`], so labels work too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbohydrates,
    Fat,
    Sugar,
    SaturatedFat,
    Cholesterol,
    Fiber,
    #[serde(rename = "omega_3")]
    Omega3,
}

impl Nutrient {
    pub const COUNT: usize = 9;

    /// Every nutrient, in display order.
    pub const ALL: [Nutrient; Nutrient::COUNT] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
        Nutrient::Sugar,
        Nutrient::SaturatedFat,
        Nutrient::Cholesterol,
        Nutrient::Fiber,
        Nutrient::Omega3,
    ];

    /// The four nutrients shown as summary cards and trend charts.
    pub const HEADLINE: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
    ];

    /// Canonical machine key, as used in JSON output and query strings.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fat => "fat",
            Nutrient::Sugar => "sugar",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Fiber => "fiber",
            Nutrient::Omega3 => "omega_3",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Carbohydrates => "Carbohydrates",
            Nutrient::Fat => "Fat",
            Nutrient::Sugar => "Sugar",
            Nutrient::SaturatedFat => "Saturated Fat",
            Nutrient::Cholesterol => "Cholesterol",
            Nutrient::Fiber => "Fiber",
            Nutrient::Omega3 => "Omega-3",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            Nutrient::Cholesterol | Nutrient::Omega3 => "mg",
            _ => "g",
        }
    }

    /// Column header used by the tabular export, e.g. `"Saturated Fat (g)"`.
    pub fn column_label(self) -> String {
        format!("{} ({})", self.display_name(), self.unit())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a string names no known nutrient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown nutrient '{0}'")]
pub struct UnknownNutrient(pub String);

impl FromStr for Nutrient {
    type Err = UnknownNutrient;

    /// Accepts the canonical key (`omega_3`) or the column label (`Omega-3 (mg)`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Nutrient::ALL
            .into_iter()
            .find(|n| {
                n.key().eq_ignore_ascii_case(wanted)
                    || n.column_label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownNutrient(s.to_string()))
    }
}

impl TryFrom<String> for Nutrient {
    type Error = UnknownNutrient;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Amount of every nutrient. Absent values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientValues([f64; Nutrient::COUNT]);

impl NutrientValues {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0[nutrient.index()] = value;
    }

    /// Builder-style setter, handy for literals.
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.into_iter().map(|n| (n, self.get(n)))
    }

    /// Applies `f` to every value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v = f(*v);
        }
        out
    }

    /// Field-wise `self - other`.
    pub fn minus(&self, other: &NutrientValues) -> Self {
        let mut out = *self;
        for n in Nutrient::ALL {
            out[n] -= other[n];
        }
        out
    }
}

impl Index<Nutrient> for NutrientValues {
    type Output = f64;

    fn index(&self, nutrient: Nutrient) -> &f64 {
        &self.0[nutrient.index()]
    }
}

impl IndexMut<Nutrient> for NutrientValues {
    fn index_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        &mut self.0[nutrient.index()]
    }
}

impl AddAssign<&NutrientValues> for NutrientValues {
    fn add_assign(&mut self, rhs: &NutrientValues) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs += rhs;
        }
    }
}

impl Serialize for NutrientValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Nutrient::COUNT))?;
        for (nutrient, value) in self.iter() {
            map.serialize_entry(nutrient.key(), &value)?;
        }
        map.end()
    }
}
