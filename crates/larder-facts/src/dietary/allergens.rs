//! The 14 EU-regulated allergen categories and "Contains" / "May contain"
//! statement parsing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::{contains_term, title_case};

const ALLERGEN_PATTERNS: [(&str, &[&str]); 14] = [
    ("celery", &["celery", "celeriac"]),
    (
        "cereals_containing_gluten",
        &["wheat", "rye", "barley", "oats", "spelt", "kamut"],
    ),
    (
        "crustaceans",
        &["crab", "lobster", "prawn", "shrimp", "crayfish", "langoustine"],
    ),
    ("eggs", &["egg", "albumen", "albumin"]),
    (
        "fish",
        &["fish", "cod", "salmon", "tuna", "anchovy", "sardine", "mackerel"],
    ),
    ("lupin", &["lupin", "lupine"]),
    (
        "milk",
        &["milk", "cream", "butter", "cheese", "whey", "casein", "lactose", "yoghurt"],
    ),
    (
        "molluscs",
        &["mussel", "oyster", "squid", "octopus", "clam", "scallop", "snail"],
    ),
    ("mustard", &["mustard"]),
    (
        "nuts",
        &[
            "almond", "hazelnut", "walnut", "cashew", "pistachio", "pecan", "brazil nut",
            "macadamia",
        ],
    ),
    ("peanuts", &["peanut", "groundnut", "arachis"]),
    ("sesame", &["sesame", "tahini"]),
    ("soya", &["soya", "soy", "edamame", "tofu", "tempeh"]),
    (
        "sulphites",
        &[
            "sulphite", "sulfite", "sulphur dioxide", "e220", "e221", "e222", "e223", "e224",
            "e225", "e226", "e227", "e228",
        ],
    ),
];

static CONTAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcontains[:\s]+([^.]+?)(?:\.|may contain|$)").expect("valid regex")
});

static MAY_CONTAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)may contain[:\s]+([^.]+?)(?:\.|$)").expect("valid regex"));

static ITEM_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;&]").expect("valid regex"));

/// Display name of an allergen category key, e.g. `"Cereals Containing Gluten"`.
fn display_name(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Allergen categories whose keywords appear in `text` on word boundaries.
#[must_use]
pub fn extract_allergens(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    ALLERGEN_PATTERNS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| contains_term(&lower, k)))
        .map(|(key, _)| display_name(key))
        .collect()
}

/// Parsed allergen statement. The two lists carry different legal weight
/// and are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllergenStatement {
    pub contains: Vec<String>,
    pub may_contain: Vec<String>,
}

impl AllergenStatement {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contains.is_empty() && self.may_contain.is_empty()
    }
}

fn split_items(clause: &str) -> Vec<String> {
    ITEM_SPLIT_RE
        .split(clause)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(title_case)
        .collect()
}

/// `"no added sugar"`, `"not suitable..."`: a denial, not an allergen list.
fn is_negated(clause: &str) -> bool {
    clause
        .split_whitespace()
        .next()
        .is_some_and(|word| matches!(word.to_ascii_lowercase().as_str(), "no" | "not" | "none"))
}

/// Items of the first non-negated clause captured by `re`.
fn first_clause(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .find(|clause| !is_negated(clause))
        .map(split_items)
        .unwrap_or_default()
}

/// Parse `"Contains: X, Y"` and `"May contain: A, B"` clauses.
///
/// Each clause runs to the next full stop, the other label, or the end of
/// the text. Negated clauses such as `contains no added sugar` are skipped.
#[must_use]
pub fn parse_allergen_statement(text: &str) -> AllergenStatement {
    let contains = first_clause(&CONTAINS_RE, text);
    let may_contain = first_clause(&MAY_CONTAIN_RE, text);
    AllergenStatement {
        contains,
        may_contain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coated_peanuts_match_peanuts() {
        let found = extract_allergens("Coated peanuts");
        assert!(found.contains("Peanuts"), "got {found:?}");
    }

    #[test]
    fn oat_milk_does_not_match_oats_keyword() {
        let found = extract_allergens("Oat milk");
        assert!(!found.contains("Cereals Containing Gluten"));
        assert!(found.contains("Milk"));
    }

    #[test]
    fn display_names_are_title_cased() {
        let found = extract_allergens("Wheat flour, sesame seeds, sulphur dioxide");
        let names: Vec<&str> = found.iter().map(String::as_str).collect();
        assert_eq!(names, ["Cereals Containing Gluten", "Sesame", "Sulphites"]);
    }

    #[test]
    fn e_numbers_need_word_boundaries() {
        assert!(extract_allergens("preservative (e220)").contains("Sulphites"));
        assert!(extract_allergens("colour e2201").is_empty());
    }

    #[test]
    fn statement_keeps_contains_and_may_contain_separate() {
        let s = parse_allergen_statement("Contains: Milk, Soya & Wheat. May contain: nuts; sesame.");
        assert_eq!(s.contains, ["Milk", "Soya", "Wheat"]);
        assert_eq!(s.may_contain, ["Nuts", "Sesame"]);
    }

    #[test]
    fn contains_clause_stops_at_may_contain_label() {
        let s = parse_allergen_statement("contains oats may contain peanuts");
        assert_eq!(s.contains, ["Oats"]);
        assert_eq!(s.may_contain, ["Peanuts"]);
    }

    #[test]
    fn negated_contains_clause_is_not_an_allergen() {
        let s = parse_allergen_statement("Oats, dates. This bar contains no added sugar.");
        assert!(s.contains.is_empty(), "got {:?}", s.contains);

        let s = parse_allergen_statement("Contains no palm oil. Contains: Sesame.");
        assert_eq!(s.contains, ["Sesame"]);
    }

    #[test]
    fn statement_without_labels_is_empty() {
        assert!(parse_allergen_statement("Store in a cool dry place.").is_empty());
    }
}
