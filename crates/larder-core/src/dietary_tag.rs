//! Canonical dietary tag vocabulary.
//!
//! Every spelling variant seen in supplier exports (`gluten-free`,
//! `GLUTEN_FREE`, `is_gluten_free`, `Gluten Free`) is folded to one
//! [`DietaryTag`] through [`DietaryTag::canonicalize`], applied once at
//! ingestion.

use serde::{Deserialize, Serialize};

/// One dietary attribute. Variants are declared in display-name order so
/// that a `BTreeSet<DietaryTag>` iterates alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DietaryTag {
    #[serde(rename = "Dairy Free")]
    DairyFree,
    Fairtrade,
    #[serde(rename = "Gluten Free")]
    GlutenFree,
    Keto,
    #[serde(rename = "Nut Free")]
    NutFree,
    Organic,
    Paleo,
    #[serde(rename = "Palm Oil Free")]
    PalmOilFree,
    Raw,
    #[serde(rename = "Seed Oil Free")]
    SeedOilFree,
    #[serde(rename = "Sugar Free")]
    SugarFree,
    Vegan,
    Vegetarian,
}

impl DietaryTag {
    pub const ALL: [DietaryTag; 13] = [
        DietaryTag::DairyFree,
        DietaryTag::Fairtrade,
        DietaryTag::GlutenFree,
        DietaryTag::Keto,
        DietaryTag::NutFree,
        DietaryTag::Organic,
        DietaryTag::Paleo,
        DietaryTag::PalmOilFree,
        DietaryTag::Raw,
        DietaryTag::SeedOilFree,
        DietaryTag::SugarFree,
        DietaryTag::Vegan,
        DietaryTag::Vegetarian,
    ];

    /// Tags shown as storefront icons.
    pub const ICONS: [DietaryTag; 4] = [
        DietaryTag::PalmOilFree,
        DietaryTag::Organic,
        DietaryTag::Vegan,
        DietaryTag::Fairtrade,
    ];

    /// Display order used for dietary summaries; unlisted tags follow
    /// alphabetically.
    const SUMMARY_PRIORITY: [DietaryTag; 8] = [
        DietaryTag::Organic,
        DietaryTag::Vegan,
        DietaryTag::Vegetarian,
        DietaryTag::GlutenFree,
        DietaryTag::DairyFree,
        DietaryTag::NutFree,
        DietaryTag::SugarFree,
        DietaryTag::Fairtrade,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DietaryTag::DairyFree => "Dairy Free",
            DietaryTag::Fairtrade => "Fairtrade",
            DietaryTag::GlutenFree => "Gluten Free",
            DietaryTag::Keto => "Keto",
            DietaryTag::NutFree => "Nut Free",
            DietaryTag::Organic => "Organic",
            DietaryTag::Paleo => "Paleo",
            DietaryTag::PalmOilFree => "Palm Oil Free",
            DietaryTag::Raw => "Raw",
            DietaryTag::SeedOilFree => "Seed Oil Free",
            DietaryTag::SugarFree => "Sugar Free",
            DietaryTag::Vegan => "Vegan",
            DietaryTag::Vegetarian => "Vegetarian",
        }
    }

    #[must_use]
    pub fn is_icon(self) -> bool {
        Self::ICONS.contains(&self)
    }

    /// Fold a free-form tag or column name to its canonical tag.
    ///
    /// Case, whitespace, `-`/`_` separators, a leading `is`/`is_` and the
    /// `fair trade` split are all ignored. Returns `None` for anything that
    /// is not a dietary attribute.
    #[must_use]
    pub fn canonicalize(raw: &str) -> Option<DietaryTag> {
        let folded: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let key = folded
            .strip_prefix("is")
            .filter(|rest| Self::from_folded(rest).is_some())
            .unwrap_or(&folded);
        Self::from_folded(key)
    }

    fn from_folded(key: &str) -> Option<DietaryTag> {
        let tag = match key {
            "dairyfree" | "milkfree" | "lactosefree" => DietaryTag::DairyFree,
            "fairtrade" | "fairlytraded" => DietaryTag::Fairtrade,
            "glutenfree" | "gf" | "coeliacfriendly" | "celiacfriendly" => DietaryTag::GlutenFree,
            "keto" | "ketofriendly" => DietaryTag::Keto,
            "nutfree" | "treenutfree" => DietaryTag::NutFree,
            "organic" | "certifiedorganic" => DietaryTag::Organic,
            "paleo" | "paleofriendly" => DietaryTag::Paleo,
            "palmoilfree" | "palmfree" | "nopalmoil" => DietaryTag::PalmOilFree,
            "raw" => DietaryTag::Raw,
            "seedoilfree" | "noseedoils" => DietaryTag::SeedOilFree,
            "sugarfree" | "noaddedsugar" | "zerosugar" => DietaryTag::SugarFree,
            "vegan" | "plantbased" => DietaryTag::Vegan,
            "vegetarian" | "veggie" => DietaryTag::Vegetarian,
            _ => return None,
        };
        Some(tag)
    }
}

impl std::fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable summary: priority tags first, the rest alphabetically,
/// joined with `". "` and terminated with a period. Empty input yields `""`.
#[must_use]
pub fn dietary_summary<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = &'a DietaryTag>,
{
    let mut ordered: Vec<DietaryTag> = tags.into_iter().copied().collect();
    ordered.sort_by_key(|tag| {
        let rank = DietaryTag::SUMMARY_PRIORITY
            .iter()
            .position(|p| p == tag)
            .unwrap_or(usize::MAX);
        (rank, tag.as_str())
    });
    ordered.dedup();
    if ordered.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = ordered.iter().map(|t| t.as_str()).collect();
    format!("{}.", names.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_folds_case_and_separators() {
        for raw in ["Gluten Free", "gluten-free", "GLUTEN_FREE", "is_gluten_free", "glutenFree"] {
            assert_eq!(DietaryTag::canonicalize(raw), Some(DietaryTag::GlutenFree), "{raw}");
        }
        assert_eq!(DietaryTag::canonicalize("Fair Trade"), Some(DietaryTag::Fairtrade));
        assert_eq!(DietaryTag::canonicalize("is_vegan"), Some(DietaryTag::Vegan));
    }

    #[test]
    fn canonicalize_rejects_unrelated_names() {
        assert_eq!(DietaryTag::canonicalize("Description"), None);
        assert_eq!(DietaryTag::canonicalize(""), None);
        assert_eq!(DietaryTag::canonicalize("island"), None);
    }

    #[test]
    fn display_matches_serde_name() {
        for tag in DietaryTag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
    }

    #[test]
    fn variant_order_is_alphabetical() {
        let names: Vec<&str> = DietaryTag::ALL.iter().map(|t| t.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn summary_uses_priority_order() {
        let tags = [DietaryTag::Keto, DietaryTag::Vegan, DietaryTag::Organic];
        assert_eq!(dietary_summary(&tags), "Organic. Vegan. Keto.");
        assert_eq!(dietary_summary(std::iter::empty()), "");
    }

    #[test]
    fn icons_are_the_four_storefront_tags() {
        assert!(DietaryTag::Organic.is_icon());
        assert!(DietaryTag::PalmOilFree.is_icon());
        assert!(!DietaryTag::GlutenFree.is_icon());
    }
}
