//! Store category enumeration and per-category content policy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Fresh,
    Drinks,
    Frozen,
    #[serde(rename = "Household and Non-Food")]
    HouseholdNonFood,
    #[serde(rename = "Body Care")]
    BodyCare,
    Health,
    #[serde(rename = "Promo and Seasonal")]
    PromoSeasonal,
    #[serde(rename = "Earthfare Kitchen")]
    Kitchen,
    /// Policy bucket for anything outside the store taxonomy.
    General,
}

const SUBCATEGORIES: &[(Category, &[&str])] = &[
    (
        Category::Groceries,
        &[
            "Ambient Grocery",
            "Baking & Home Cooking",
            "Breakfast & Cereals",
            "Condiments & Sauces",
            "Cooking Oils & Vinegars",
            "Herbs, Spices & Seasonings",
            "Jams, Honey & Spreads",
            "Pasta, Rice & Grains",
            "Snacks & Treats",
            "Tinned & Jarred Foods",
            "World Foods",
        ],
    ),
    (
        Category::Fresh,
        &[
            "Bakery",
            "Cheese",
            "Chilled Deli",
            "Dairy & Alternatives",
            "Fresh Fruit & Veg",
            "Meat & Fish Alternatives",
            "Ready Meals & Fresh Pasta",
        ],
    ),
    (
        Category::Drinks,
        &[
            "Coffee & Tea",
            "Fruit Juices & Smoothies",
            "Soft Drinks & Cordials",
            "Water",
            "Wine, Beer & Spirits",
        ],
    ),
    (
        Category::Frozen,
        &[
            "Frozen Desserts",
            "Frozen Fruit & Veg",
            "Frozen Meals & Pizza",
            "Frozen Meat Alternatives",
            "Ice Cream & Lollies",
        ],
    ),
    (
        Category::HouseholdNonFood,
        &[
            "Cleaning Products",
            "Kitchen & Household",
            "Laundry",
            "Pet Food & Care",
            "Stationery & Gifts",
        ],
    ),
    (
        Category::BodyCare,
        &[
            "Baby & Child",
            "Bath & Shower",
            "Dental Care",
            "Deodorants",
            "Face & Skincare",
            "Hair Care",
            "Hand & Body",
            "Men's Grooming",
            "Period Care",
            "Sun Care",
        ],
    ),
    (
        Category::Health,
        &[
            "First Aid & Medical",
            "Supplements & Vitamins",
            "Wellness & Natural Remedies",
        ],
    ),
    (
        Category::PromoSeasonal,
        &["Christmas", "Easter", "Gift Sets", "Seasonal Specials"],
    ),
    (
        Category::Kitchen,
        &[
            "Hot Food",
            "Sandwiches & Wraps",
            "Salads & Sides",
            "Cakes & Pastries",
        ],
    ),
];

impl Category {
    pub const STORE: [Category; 9] = [
        Category::Groceries,
        Category::Fresh,
        Category::Drinks,
        Category::Frozen,
        Category::HouseholdNonFood,
        Category::BodyCare,
        Category::Health,
        Category::PromoSeasonal,
        Category::Kitchen,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Fresh => "Fresh",
            Category::Drinks => "Drinks",
            Category::Frozen => "Frozen",
            Category::HouseholdNonFood => "Household and Non-Food",
            Category::BodyCare => "Body Care",
            Category::Health => "Health",
            Category::PromoSeasonal => "Promo and Seasonal",
            Category::Kitchen => "Earthfare Kitchen",
            Category::General => "General",
        }
    }

    /// Resolve a raw category or subcategory name to its policy bucket.
    ///
    /// Matching is case-insensitive; anything unrecognised maps to
    /// [`Category::General`]. The raw value itself is never rewritten.
    #[must_use]
    pub fn resolve(raw: &str) -> Category {
        let wanted = raw.trim();
        if let Some(main) = Self::STORE
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
        {
            return *main;
        }
        SUBCATEGORIES
            .iter()
            .find(|(_, subs)| subs.iter().any(|s| s.eq_ignore_ascii_case(wanted)))
            .map_or(Category::General, |(main, _)| *main)
    }

    /// Lifestyle-to-technical copy ratio, in percent.
    #[must_use]
    pub fn content_ratio(self) -> (u8, u8) {
        match self {
            Category::Groceries | Category::Drinks => (70, 30),
            Category::Fresh | Category::PromoSeasonal => (80, 20),
            Category::Frozen | Category::General => (60, 40),
            Category::HouseholdNonFood => (40, 60),
            Category::BodyCare => (50, 50),
            Category::Health => (30, 70),
            Category::Kitchen => (85, 15),
        }
    }

    /// Specification keys that may be passed to copy generation.
    #[must_use]
    pub fn allowed_specs(self) -> &'static [&'static str] {
        match self {
            Category::Groceries | Category::Frozen => &[
                "weight",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
                "storage",
            ],
            Category::Fresh => &[
                "weight",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
                "producer",
                "storage",
            ],
            Category::Drinks => &[
                "volume",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
                "servings",
            ],
            Category::HouseholdNonFood | Category::BodyCare => &[
                "volume",
                "weight",
                "origin",
                "certifications",
                "ingredients",
                "usage",
            ],
            Category::Health => &[
                "weight",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
                "dosage",
                "servings",
            ],
            Category::Kitchen => &[
                "weight",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
                "allergens",
            ],
            Category::PromoSeasonal | Category::General => &[
                "weight",
                "origin",
                "dietary",
                "certifications",
                "ingredients",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a raw category needs the supplement safety disclaimer.
#[must_use]
pub fn needs_supplement_disclaimer(raw_category: &str) -> bool {
    let lower = raw_category.to_lowercase();
    lower.trim() == "health" || lower.contains("supplement") || lower.contains("wellness")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_main_category_case_insensitively() {
        assert_eq!(Category::resolve("groceries"), Category::Groceries);
        assert_eq!(Category::resolve(" Body Care "), Category::BodyCare);
    }

    #[test]
    fn resolve_subcategory_to_parent() {
        assert_eq!(Category::resolve("Snacks & Treats"), Category::Groceries);
        assert_eq!(Category::resolve("supplements & vitamins"), Category::Health);
    }

    #[test]
    fn unknown_category_falls_back_to_general() {
        assert_eq!(Category::resolve("Store Cupboard"), Category::General);
        assert_eq!(Category::resolve(""), Category::General);
    }

    #[test]
    fn general_policy_is_the_fallback_allow_list() {
        let specs = Category::General.allowed_specs();
        assert!(specs.contains(&"ingredients"));
        assert!(!specs.contains(&"dosage"));
        assert_eq!(Category::General.content_ratio(), (60, 40));
    }

    #[test]
    fn supplement_disclaimer_applies_to_health_like_categories() {
        assert!(needs_supplement_disclaimer("Health"));
        assert!(needs_supplement_disclaimer("Supplements & Vitamins"));
        assert!(needs_supplement_disclaimer("Wellness & Natural Remedies"));
        assert!(!needs_supplement_disclaimer("Groceries"));
    }
}
