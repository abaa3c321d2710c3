//! Display lines, per-serving scaling, and UK nutrition claim thresholds.

use std::sync::LazyLock;

use larder_core::nutrition::EXTENDED_NUTRIENTS;
use larder_core::Nutrition;
use regex::Regex;

use super::values::format_amount;
use crate::text::title_case;

/// UK label order after energy, with display labels and units.
const LABEL_ORDER: [(&str, &str, &str); 7] = [
    ("fat", "Fat", "g"),
    ("saturates", "of which Saturates", "g"),
    ("carbohydrates", "Carbohydrate", "g"),
    ("sugars", "of which Sugars", "g"),
    ("fibre", "Fibre", "g"),
    ("protein", "Protein", "g"),
    ("salt", "Salt", "g"),
];

const LOW_SUGAR_MAX_G: f64 = 5.0;
const LOW_FAT_MAX_G: f64 = 3.0;
const HIGH_FIBRE_MIN_G: f64 = 6.0;
const HIGH_PROTEIN_MIN_ENERGY_SHARE: f64 = 0.20;
const KCAL_PER_G_PROTEIN: f64 = 4.0;

static SERVING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:serving size|per serving|portion size)[:\s]*(\d+(?:\.\d+)?)\s*g\b")
        .expect("valid regex")
});

fn unit_for(key: &str) -> &'static str {
    match key {
        "vitamin_a" | "vitamin_d" | "vitamin_b12" => "µg",
        "cholesterol" | "vitamin_b1" | "vitamin_b2" | "vitamin_b6" | "vitamin_c"
        | "vitamin_e" | "calcium" | "iron" | "magnesium" | "zinc" | "potassium" => "mg",
        _ => "g",
    }
}

fn extended_label(key: &str) -> String {
    match key {
        "omega_3" => "Omega-3".to_string(),
        "omega_6" => "Omega-6".to_string(),
        _ => match key.strip_prefix("vitamin_") {
            Some(letter) => format!("Vitamin {}", letter.to_uppercase()),
            None => title_case(&key.replace('_', " ")),
        },
    }
}

fn with_unit(value: &str, unit: &str) -> String {
    if value.to_lowercase().ends_with(&unit.to_lowercase()) {
        value.to_string()
    } else {
        format!("{value}{unit}")
    }
}

fn energy_line(nutrition: &Nutrition) -> Option<String> {
    let kj = nutrition.get("energy_kj").map(|v| with_unit(v, "kJ"));
    let kcal = nutrition.get("energy_kcal").map(|v| with_unit(v, "kcal"));
    match (kj, kcal) {
        (Some(kj), Some(kcal)) => Some(format!("Energy: {kj} / {kcal}")),
        (Some(one), None) | (None, Some(one)) => Some(format!("Energy: {one}")),
        (None, None) => None,
    }
}

/// `"Label: value+unit"` lines in UK label order, followed by any extended
/// nutrients present (sodium included).
#[must_use]
pub fn metafield_lines(nutrition: &Nutrition) -> Vec<String> {
    let mut lines: Vec<String> = energy_line(nutrition).into_iter().collect();
    lines.extend(LABEL_ORDER.iter().filter_map(|(key, label, unit)| {
        nutrition
            .get(key)
            .map(|value| format!("{label}: {}", with_unit(value, unit)))
    }));

    let extras = std::iter::once("sodium").chain(EXTENDED_NUTRIENTS.iter().copied());
    for key in extras {
        if let Some(value) = nutrition.get(key) {
            lines.push(format!(
                "{}: {}",
                extended_label(key),
                with_unit(value, unit_for(key))
            ));
        }
    }
    lines
}

/// Serving size in grams from phrases like `"Serving size: 30g"`.
#[must_use]
pub fn extract_serving_size(text: &str) -> Option<f64> {
    SERVING_RE
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .filter(|grams| *grams > 0.0)
}

/// Scale per-100g values to a serving. Values that are not plain numbers
/// (e.g. `"<0.1"`) are carried over unchanged.
#[must_use]
pub fn per_serving(nutrition: &Nutrition, serving_grams: f64) -> Nutrition {
    if serving_grams <= 0.0 {
        return nutrition.clone();
    }
    let multiplier = serving_grams / 100.0;
    nutrition
        .iter()
        .map(|(key, value)| {
            let scaled = value.parse::<f64>().map_or_else(
                |_| value.to_string(),
                |amount| format_amount((amount * multiplier * 10.0).round() / 10.0),
            );
            (key.to_string(), scaled)
        })
        .collect()
}

#[must_use]
pub fn is_low_sugar(nutrition: &Nutrition) -> bool {
    nutrition
        .amount("sugars")
        .is_some_and(|g| g <= LOW_SUGAR_MAX_G)
}

#[must_use]
pub fn is_low_fat(nutrition: &Nutrition) -> bool {
    nutrition.amount("fat").is_some_and(|g| g <= LOW_FAT_MAX_G)
}

/// At least 20% of energy from protein.
#[must_use]
pub fn is_high_protein(nutrition: &Nutrition) -> bool {
    match (nutrition.amount("protein"), nutrition.amount("energy_kcal")) {
        (Some(protein), Some(kcal)) if kcal > 0.0 => {
            protein * KCAL_PER_G_PROTEIN / kcal >= HIGH_PROTEIN_MIN_ENERGY_SHARE
        }
        _ => false,
    }
}

#[must_use]
pub fn is_high_fibre(nutrition: &Nutrition) -> bool {
    nutrition
        .amount("fibre")
        .is_some_and(|g| g >= HIGH_FIBRE_MIN_G)
}

/// Marketing claims the per-100g values support.
#[must_use]
pub fn nutrition_claims(nutrition: &Nutrition) -> Vec<&'static str> {
    let checks: [(fn(&Nutrition) -> bool, &'static str); 4] = [
        (is_low_sugar, "Low Sugar"),
        (is_low_fat, "Low Fat"),
        (is_high_protein, "High Protein"),
        (is_high_fibre, "High Fibre"),
    ];
    checks
        .iter()
        .filter(|(check, _)| check(nutrition))
        .map(|(_, claim)| *claim)
        .collect()
}
