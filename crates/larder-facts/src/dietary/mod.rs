//! Dietary attribute inference.
//!
//! Each [`DietaryRule`] pairs a tag with a list of disqualifying
//! ingredients and a list of positive marker phrases. Certification-style
//! tags (`requires_explicit_marker`) are only ever added on a marker match;
//! all other tags may also be inferred from a non-empty ingredient list that
//! contains none of the negatives.

pub mod allergens;
pub mod certifications;
pub mod ingredients;

use std::collections::BTreeSet;

use larder_core::{DietaryTag, Nutrition};

use crate::text::contains_term;

/// Sugars per 100g at or below which a product counts as sugar free.
const SUGAR_FREE_MAX_G: f64 = 0.5;

#[derive(Debug)]
pub struct DietaryRule {
    pub tag: DietaryTag,
    pub negative_ingredients: &'static [&'static str],
    pub positive_markers: &'static [&'static str],
    pub requires_explicit_marker: bool,
}

const MEAT_AND_FISH: &[&str] = &[
    "meat", "beef", "pork", "chicken", "fish", "seafood", "anchovy", "prawn", "shrimp",
    "crab", "lobster", "bacon", "ham", "lard", "tallow", "suet", "gelatin", "gelatine",
    "collagen", "isinglass",
];

const VEGAN_NEGATIVES: &[&str] = &[
    // dairy
    "milk", "dairy", "cream", "butter", "cheese", "whey", "casein", "lactose", "ghee",
    "yoghurt", "yogurt", "curd", "buttermilk",
    // eggs
    "egg", "albumen", "albumin", "mayonnaise", "meringue",
    // meat and fish
    "meat", "beef", "pork", "chicken", "fish", "seafood", "anchovy", "prawn", "shrimp",
    "crab", "lobster", "bacon", "ham", "lard", "tallow", "suet", "gelatin", "gelatine",
    "collagen",
    // other animal products
    "honey", "beeswax", "royal jelly", "propolis", "shellac", "carmine", "cochineal",
    "isinglass", "lanolin", "keratin", "silk", "wool",
];

pub static DIETARY_RULES: [DietaryRule; 13] = [
    DietaryRule {
        tag: DietaryTag::GlutenFree,
        negative_ingredients: &[
            "wheat", "barley", "rye", "oats", "spelt", "kamut", "triticale", "semolina",
            "durum", "bulgur", "couscous", "farina", "farro", "gluten", "seitan", "malt",
            "brewer's yeast",
        ],
        positive_markers: &[
            "gluten free", "gluten-free", "gf", "coeliac friendly", "celiac friendly",
        ],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::Vegan,
        negative_ingredients: VEGAN_NEGATIVES,
        positive_markers: &["vegan", "plant-based", "plant based", "100% plant", "no animal"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::Vegetarian,
        negative_ingredients: MEAT_AND_FISH,
        positive_markers: &["vegetarian", "veggie", "meat free", "meat-free"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::DairyFree,
        negative_ingredients: &[
            "milk", "dairy", "cream", "butter", "cheese", "whey", "casein", "lactose", "ghee",
            "yoghurt", "yogurt", "curd", "buttermilk", "milk powder", "milk solids",
            "milk protein", "fromage", "quark",
        ],
        positive_markers: &[
            "dairy free", "dairy-free", "lactose free", "lactose-free", "milk free",
        ],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::NutFree,
        negative_ingredients: &[
            "almond", "hazelnut", "walnut", "cashew", "pistachio", "pecan", "brazil nut",
            "macadamia", "chestnut", "pine nut", "praline", "marzipan", "frangipane",
            "nougat", "nut butter", "nut oil", "peanut",
        ],
        positive_markers: &["nut free", "nut-free", "tree nut free", "peanut free"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::SugarFree,
        negative_ingredients: &[
            "sugar", "sucrose", "glucose", "fructose", "dextrose", "maltose", "lactose",
            "galactose", "trehalose", "demerara", "muscovado", "molasses", "treacle",
            "golden syrup", "maple syrup", "agave", "honey", "corn syrup", "hfcs",
            "invert sugar",
        ],
        positive_markers: &[
            "sugar free", "sugar-free", "no added sugar", "unsweetened", "zero sugar",
        ],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::SeedOilFree,
        negative_ingredients: &[
            "sunflower oil", "rapeseed oil", "canola oil", "vegetable oil", "soybean oil",
            "soya oil", "corn oil", "cottonseed oil", "safflower oil", "grapeseed oil",
            "rice bran oil", "palm oil", "palm kernel oil",
        ],
        positive_markers: &["seed oil free", "no seed oils"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::PalmOilFree,
        negative_ingredients: &[
            "palm oil", "palm kernel oil", "palm fat", "palmitate", "palmate", "palm stearin",
            "palm olein", "glyceryl stearate", "stearic acid", "sodium laureth sulfate",
            "sodium lauryl sulfate",
        ],
        positive_markers: &["palm oil free", "palm-free", "no palm oil"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::Organic,
        negative_ingredients: &[],
        positive_markers: &["organic", "certified organic", "soil association"],
        requires_explicit_marker: true,
    },
    DietaryRule {
        tag: DietaryTag::Fairtrade,
        negative_ingredients: &[],
        positive_markers: &["fairtrade", "fair trade", "fairly traded"],
        requires_explicit_marker: true,
    },
    DietaryRule {
        tag: DietaryTag::Raw,
        negative_ingredients: &[],
        positive_markers: &["raw", "unroasted", "uncooked", "cold pressed"],
        requires_explicit_marker: true,
    },
    DietaryRule {
        tag: DietaryTag::Keto,
        negative_ingredients: &[
            "sugar", "flour", "wheat", "rice", "potato", "corn starch", "bread", "pasta",
            "cereal", "oats",
        ],
        positive_markers: &["keto", "keto friendly", "keto-friendly", "low carb"],
        requires_explicit_marker: false,
    },
    DietaryRule {
        tag: DietaryTag::Paleo,
        negative_ingredients: &[
            "dairy", "milk", "cheese", "wheat", "grain", "legume", "bean", "lentil",
            "peanut", "soy", "corn", "potato", "sugar", "refined",
        ],
        positive_markers: &["paleo", "paleo friendly", "paleo-friendly"],
        requires_explicit_marker: false,
    },
];

impl DietaryRule {
    fn marker_in(&self, text: &str) -> bool {
        self.positive_markers.iter().any(|m| contains_term(text, m))
    }

    fn negative_in(&self, ingredients: &str) -> bool {
        self.negative_ingredients
            .iter()
            .any(|n| contains_term(ingredients, n))
    }
}

/// Derive dietary tags from ingredient text, auxiliary product text,
/// explicit badges, and per-100g nutrition.
///
/// An empty ingredient list means "unknown": it never qualifies a product
/// for an absence-based tag.
#[must_use]
pub fn detect_dietary(
    ingredients: &str,
    auxiliary_text: &str,
    badges: &BTreeSet<DietaryTag>,
    nutrition: &Nutrition,
) -> BTreeSet<DietaryTag> {
    let ingredients_lower = ingredients.trim().to_lowercase();
    let all_text = format!("{ingredients_lower} {}", auxiliary_text.to_lowercase());

    let mut tags = BTreeSet::new();
    for rule in &DIETARY_RULES {
        let has_marker = badges.contains(&rule.tag) || rule.marker_in(&all_text);

        if rule.requires_explicit_marker {
            if has_marker {
                tags.insert(rule.tag);
            }
            continue;
        }

        let inferable = !ingredients_lower.is_empty() && !rule.negative_ingredients.is_empty();
        if has_marker || (inferable && !rule.negative_in(&ingredients_lower)) {
            tags.insert(rule.tag);
        }
    }

    if nutrition
        .amount("sugars")
        .is_some_and(|sugars| sugars <= SUGAR_FREE_MAX_G)
    {
        tags.insert(DietaryTag::SugarFree);
    }

    tags
}

/// Tags whose positive markers appear in free badge or label text.
///
/// Each entry is first tried as a canonical tag name, then scanned for
/// marker phrases.
#[must_use]
pub fn badges_from_text<S: AsRef<str>>(entries: &[S]) -> BTreeSet<DietaryTag> {
    let mut tags = BTreeSet::new();
    for entry in entries {
        let entry = entry.as_ref();
        if let Some(tag) = DietaryTag::canonicalize(entry) {
            tags.insert(tag);
            continue;
        }
        let lower = entry.to_lowercase();
        tags.extend(
            DIETARY_RULES
                .iter()
                .filter(|rule| rule.marker_in(&lower))
                .map(|rule| rule.tag),
        );
    }
    tags
}

#[cfg(test)]
#[path = "dietary_test.rs"]
mod tests;
