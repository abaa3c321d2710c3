use larder_core::Nutrition;
use serde_json::{Map, Value};

use super::values::format_amount;

/// Open Food Facts `nutriments` keys and the canonical keys they map to.
/// `energy_100g` is kJ and only used when `energy-kj_100g` is absent.
const OFF_KEYS: [(&str, &str); 32] = [
    ("energy-kcal_100g", "energy_kcal"),
    ("energy-kj_100g", "energy_kj"),
    ("energy_100g", "energy_kj"),
    ("fat_100g", "fat"),
    ("saturated-fat_100g", "saturates"),
    ("monounsaturated-fat_100g", "monounsaturates"),
    ("polyunsaturated-fat_100g", "polyunsaturates"),
    ("trans-fat_100g", "trans_fat"),
    ("cholesterol_100g", "cholesterol"),
    ("carbohydrates_100g", "carbohydrates"),
    ("sugars_100g", "sugars"),
    ("polyols_100g", "polyols"),
    ("starch_100g", "starch"),
    ("fiber_100g", "fibre"),
    ("proteins_100g", "protein"),
    ("salt_100g", "salt"),
    ("sodium_100g", "sodium"),
    ("vitamin-a_100g", "vitamin_a"),
    ("vitamin-b1_100g", "vitamin_b1"),
    ("vitamin-b2_100g", "vitamin_b2"),
    ("vitamin-b6_100g", "vitamin_b6"),
    ("vitamin-b12_100g", "vitamin_b12"),
    ("vitamin-c_100g", "vitamin_c"),
    ("vitamin-d_100g", "vitamin_d"),
    ("vitamin-e_100g", "vitamin_e"),
    ("calcium_100g", "calcium"),
    ("iron_100g", "iron"),
    ("magnesium_100g", "magnesium"),
    ("zinc_100g", "zinc"),
    ("potassium_100g", "potassium"),
    ("omega-3-fat_100g", "omega_3"),
    ("omega-6-fat_100g", "omega_6"),
];

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(super) fn from_open_food_facts(nutriments: &Map<String, Value>) -> Nutrition {
    let mut nutrition = Nutrition::new();
    for (off_key, key) in &OFF_KEYS {
        if nutrition.contains(key) {
            continue;
        }
        if let Some(amount) = nutriments.get(*off_key).and_then(numeric) {
            nutrition.insert(*key, format_amount(amount));
        }
    }
    nutrition
}
