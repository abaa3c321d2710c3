//! Canonical per-100g nutrition record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// UK label nutrients, in label order.
pub const CORE_NUTRIENTS: [&str; 10] = [
    "energy_kj",
    "energy_kcal",
    "fat",
    "saturates",
    "carbohydrates",
    "sugars",
    "fibre",
    "protein",
    "salt",
    "sodium",
];

/// Additional nutrients recognised when a source reports them.
pub const EXTENDED_NUTRIENTS: [&str; 21] = [
    "monounsaturates",
    "polyunsaturates",
    "trans_fat",
    "cholesterol",
    "polyols",
    "starch",
    "omega_3",
    "omega_6",
    "vitamin_a",
    "vitamin_b1",
    "vitamin_b2",
    "vitamin_b6",
    "vitamin_b12",
    "vitamin_c",
    "vitamin_d",
    "vitamin_e",
    "calcium",
    "iron",
    "magnesium",
    "zinc",
    "potassium",
];

/// Map of canonical nutrient key to per-100g numeric string.
///
/// Values keep qualifiers such as `"<0.5"`; [`Nutrition::amount`] strips
/// them for numeric comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nutrition(BTreeMap<String, String>);

impl Nutrition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, ignoring blanks.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.0.insert(key.into(), trimmed.to_string());
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric value of `key`, treating `"<0.5"` as `0.5`.
    #[must_use]
    pub fn amount(&self, key: &str) -> Option<f64> {
        self.get(key)
            .map(|v| v.trim_start_matches('<').trim())
            .and_then(|v| v.parse::<f64>().ok())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `true` when the key is one of the recognised canonical nutrients.
    #[must_use]
    pub fn is_known_key(key: &str) -> bool {
        CORE_NUTRIENTS.contains(&key) || EXTENDED_NUTRIENTS.contains(&key)
    }
}

impl FromIterator<(String, String)> for Nutrition {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut nutrition = Nutrition::new();
        for (k, v) in iter {
            nutrition.insert(k, v);
        }
        nutrition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_skips_blank_values() {
        let mut n = Nutrition::new();
        n.insert("fat", "  ");
        n.insert("salt", " 0.3 ");
        assert!(!n.contains("fat"));
        assert_eq!(n.get("salt"), Some("0.3"));
    }

    #[test]
    fn amount_strips_less_than_qualifier() {
        let mut n = Nutrition::new();
        n.insert("sugars", "<0.5");
        n.insert("fat", "trace");
        assert_eq!(n.amount("sugars"), Some(0.5));
        assert_eq!(n.amount("fat"), None);
        assert_eq!(n.amount("protein"), None);
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut n = Nutrition::new();
        n.insert("protein", "12");
        assert_eq!(serde_json::to_string(&n).unwrap(), r#"{"protein":"12"}"#);
    }
}
