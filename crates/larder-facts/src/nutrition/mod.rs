//! Nutrition normalisation.
//!
//! Four input shapes (HTML, loose text, CSV columns, Open Food Facts
//! nutriments) converge on one [`Nutrition`] record keyed by canonical
//! nutrient names with per-100g numeric-string values.

pub mod format;
mod html;
mod mapping;
mod values;

use std::sync::LazyLock;

use larder_core::Nutrition;
use regex::Regex;

pub use format::{
    extract_serving_size, is_high_fibre, is_high_protein, is_low_fat, is_low_sugar,
    metafield_lines, nutrition_claims, per_serving,
};
pub use values::clean_value;

const KJ_PER_KCAL: f64 = 4.184;

/// A nutrition source in one of the supported shapes.
#[derive(Debug, Clone, Copy)]
pub enum NutritionInput<'a> {
    /// Page HTML; the first usable nutrition table wins, else its text.
    Html(&'a str),
    /// Free text such as a scraped label paragraph.
    Text(&'a str),
    /// `(header, value)` pairs from a CSV row.
    Columns(&'a [(String, String)]),
    /// The `product.nutriments` object of an Open Food Facts response.
    OpenFoodFacts(&'a serde_json::Map<String, serde_json::Value>),
}

/// Parse any supported nutrition source into the canonical record.
///
/// Whenever one energy unit is known the other is derived, so the result
/// never carries only one of `energy_kj` / `energy_kcal`.
#[must_use]
pub fn parse_nutrition(input: NutritionInput<'_>) -> Nutrition {
    let mut nutrition = match input {
        NutritionInput::Html(html) => html::parse_html(html),
        NutritionInput::Text(text) => parse_text(text),
        NutritionInput::Columns(columns) => parse_labelled_rows(
            columns
                .iter()
                .map(|(label, value)| (label.as_str(), value.as_str())),
        ),
        NutritionInput::OpenFoodFacts(nutriments) => mapping::from_open_food_facts(nutriments),
    };
    ensure_energy_pair(&mut nutrition);
    nutrition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnergyUnit {
    Kj,
    Kcal,
}

/// `(key, label pattern, unit pattern)`. Order matters: more specific
/// labels (`monounsaturates`, `saturates`) precede the general ones (`fat`).
const NUTRIENT_LABELS: [(&str, &str, &str); 29] = [
    ("monounsaturates", r"mono-?\s?unsaturate[sd]?", "g"),
    ("polyunsaturates", r"poly-?\s?unsaturate[sd]?", "g"),
    ("trans_fat", r"\btrans\b", "g"),
    ("saturates", r"saturate[sd]?", "g"),
    ("fat", r"\bfats?\b", "g"),
    ("polyols", r"\bpolyols?\b", "g"),
    ("starch", r"\bstarch\b", "g"),
    ("sugars", r"\bsugars?\b", "g"),
    ("fibre", r"\bfib(?:re|er)\b", "g"),
    ("carbohydrates", r"\bcarbohydrates?\b|\bcarbs\b", "g"),
    ("protein", r"\bproteins?\b", "g"),
    ("salt", r"\bsalt\b", "g"),
    ("sodium", r"\bsodium\b", "(?:mg|g)"),
    ("cholesterol", r"\bcholesterol\b", "mg"),
    ("omega_3", r"\bomega[\s-]?3\b", "(?:mg|g)"),
    ("omega_6", r"\bomega[\s-]?6\b", "(?:mg|g)"),
    ("vitamin_a", r"\bvitamin\s*a\b", "(?:µg|mcg|ug)"),
    ("vitamin_b12", r"\bvitamin\s*b12\b", "(?:µg|mcg|ug)"),
    ("vitamin_b1", r"\bvitamin\s*b1\b|\bthiamin", "mg"),
    ("vitamin_b2", r"\bvitamin\s*b2\b|\briboflavin", "mg"),
    ("vitamin_b6", r"\bvitamin\s*b6\b", "mg"),
    ("vitamin_c", r"\bvitamin\s*c\b", "mg"),
    ("vitamin_d", r"\bvitamin\s*d\b", "(?:µg|mcg|ug)"),
    ("vitamin_e", r"\bvitamin\s*e\b", "mg"),
    ("calcium", r"\bcalcium\b", "mg"),
    ("iron", r"\biron\b", "mg"),
    ("magnesium", r"\bmagnesium\b", "mg"),
    ("zinc", r"\bzinc\b", "mg"),
    ("potassium", r"\bpotassium\b", "mg"),
];

static LABEL_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    NUTRIENT_LABELS
        .iter()
        .map(|(key, label, _)| {
            (
                *key,
                Regex::new(&format!("(?i){label}")).expect("valid regex"),
            )
        })
        .collect()
});

static TEXT_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    NUTRIENT_LABELS
        .iter()
        .map(|(key, label, unit)| {
            let pattern = format!(
                r"(?i)(?:{label})[:\s]*(?P<v>trace\b|tr\b|(?:<\s*|less than\s*)?\d+(?:[.,]\d+)?\s*{unit}\b)"
            );
            (*key, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

static ENERGY_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:energy|calories|kcal|kj)\b").expect("valid regex"));

static KJ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*kj\b").expect("valid regex"));

static KCAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*kcal\b").expect("valid regex"));

enum LabelKind {
    Energy(Option<EnergyUnit>),
    Nutrient(&'static str),
}

fn classify_label(label: &str) -> Option<LabelKind> {
    let lower = label.to_lowercase();
    if ENERGY_LABEL_RE.is_match(&lower) {
        let hint = if lower.contains("kcal") || lower.contains("calorie") {
            Some(EnergyUnit::Kcal)
        } else if lower.contains("kj") {
            Some(EnergyUnit::Kj)
        } else {
            None
        };
        return Some(LabelKind::Energy(hint));
    }
    LABEL_RES
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(key, _)| LabelKind::Nutrient(*key))
}

fn insert_missing(nutrition: &mut Nutrition, key: &str, value: String) {
    if !nutrition.contains(key) {
        nutrition.insert(key, value);
    }
}

/// Fill energy values from a cell such as `"1046kJ / 250kcal"`, falling
/// back to the label's unit for a bare number.
fn read_energy(nutrition: &mut Nutrition, value: &str, hint: Option<EnergyUnit>) {
    let kj = KJ_RE.captures(value).map(|c| c[1].replace(',', ""));
    let kcal = KCAL_RE.captures(value).map(|c| c[1].replace(',', ""));
    if kj.is_none() && kcal.is_none() {
        if let (Some(unit), Some(number)) = (hint, clean_value(value)) {
            let key = match unit {
                EnergyUnit::Kj => "energy_kj",
                EnergyUnit::Kcal => "energy_kcal",
            };
            insert_missing(nutrition, key, number);
        }
        return;
    }
    if let Some(kj) = kj {
        insert_missing(nutrition, "energy_kj", kj);
    }
    if let Some(kcal) = kcal {
        insert_missing(nutrition, "energy_kcal", kcal);
    }
}

/// Match `(label, value)` pairs against the nutrient label table. The first
/// value seen for a key wins.
fn parse_labelled_rows<'a, I>(rows: I) -> Nutrition
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut nutrition = Nutrition::new();
    for (label, value) in rows {
        match classify_label(label) {
            Some(LabelKind::Energy(hint)) => read_energy(&mut nutrition, value, hint),
            Some(LabelKind::Nutrient(key)) => {
                if let Some(cleaned) = clean_value(value) {
                    insert_missing(&mut nutrition, key, cleaned);
                }
            }
            None => {}
        }
    }
    nutrition
}

/// Regex extraction over free text, used when no table is usable.
fn parse_text(text: &str) -> Nutrition {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut nutrition = Nutrition::new();

    if let Some(c) = KJ_RE.captures(&text) {
        nutrition.insert("energy_kj", c[1].replace(',', ""));
    }
    if let Some(c) = KCAL_RE.captures(&text) {
        nutrition.insert("energy_kcal", c[1].replace(',', ""));
    }
    for (key, re) in TEXT_RES.iter() {
        if let Some(value) = re
            .captures(&text)
            .and_then(|c| c.name("v"))
            .and_then(|m| clean_value(m.as_str()))
        {
            nutrition.insert(*key, value);
        }
    }
    nutrition
}

/// Derive the missing energy unit from the one that is present.
fn ensure_energy_pair(nutrition: &mut Nutrition) {
    let kj = nutrition.amount("energy_kj");
    let kcal = nutrition.amount("energy_kcal");
    match (kj, kcal) {
        (Some(kj), None) => {
            nutrition.insert("energy_kcal", format!("{:.0}", (kj / KJ_PER_KCAL).round()));
        }
        (None, Some(kcal)) => {
            nutrition.insert("energy_kj", format!("{:.0}", (kcal * KJ_PER_KCAL).round()));
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "nutrition_test.rs"]
mod tests;
