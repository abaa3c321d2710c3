use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::dietary_tag::DietaryTag;
use crate::nutrition::Nutrition;
use crate::provenance::{DataSource, Field, Provenance};
use crate::CoreError;

/// Generated marketing copy attached by the copywriting step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptions {
    pub title: String,
    pub body_html: String,
    pub short_description: String,
    pub meta_description: String,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub brand: String,
}

/// Canonical product record, accumulated across pipeline stages.
///
/// Enrichment fields are written through the `fill_*` methods, which only
/// act on empty fields and record provenance for every value they set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub barcode: String,
    pub shopify_id: String,
    pub shopify_handle: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub specifications: BTreeMap<String, String>,
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    pub certifications: Vec<String>,
    pub weight_grams: Option<u32>,
    pub image_path: String,
    pub description: String,
    pub ingredients: String,
    pub ingredients_list: Vec<String>,
    pub nutrition: Nutrition,
    pub nutrition_lines: Vec<String>,
    /// Explicit dietary claims from flags, badges, or certification text.
    pub dietary_badges: BTreeSet<DietaryTag>,
    /// Tags the source explicitly marked as not applying (`Vegan = No`).
    pub dietary_denied: BTreeSet<DietaryTag>,
    pub dietary: BTreeSet<DietaryTag>,
    pub allergens: BTreeSet<String>,
    pub may_contain: Vec<String>,
    pub icons: BTreeSet<DietaryTag>,
    pub descriptions: Option<Descriptions>,
    pub provenance: Provenance,
    pub enrichment_error: Option<String>,
    pub generation_error: Option<String>,
}

impl Product {
    /// Create a draft record. A blank name is rejected, never defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingName`] when `name` is blank.
    pub fn draft(name: &str, category: &str) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::MissingName { sku: String::new() });
        }
        Ok(Self {
            name: name.to_string(),
            category: category.trim().to_string(),
            ..Self::default()
        })
    }

    /// Policy bucket for rule lookups; the raw `category` is left untouched.
    #[must_use]
    pub fn policy_category(&self) -> Category {
        Category::resolve(&self.category)
    }

    #[must_use]
    pub fn source_of(&self, field: Field) -> Option<&DataSource> {
        self.provenance.source_of(field)
    }

    #[must_use]
    pub fn nutrition_source(&self) -> Option<&DataSource> {
        self.source_of(Field::Nutrition)
    }

    /// `true` once the inventory matcher has assigned an existing listing.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        !self.shopify_id.is_empty() || !self.shopify_handle.is_empty()
    }

    pub fn fill_ingredients(&mut self, text: &str, source: DataSource) -> bool {
        let text = text.trim();
        if !self.ingredients.is_empty() || text.is_empty() {
            return false;
        }
        self.ingredients = text.to_string();
        self.provenance.record(Field::Ingredients, source);
        true
    }

    pub fn fill_nutrition(&mut self, nutrition: Nutrition, source: DataSource) -> bool {
        if !self.nutrition.is_empty() || nutrition.is_empty() {
            return false;
        }
        self.nutrition = nutrition;
        self.provenance.record(Field::Nutrition, source);
        true
    }

    pub fn fill_allergens<I, S>(&mut self, allergens: I, source: DataSource) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.allergens.is_empty() {
            return false;
        }
        let incoming: BTreeSet<String> = allergens
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if incoming.is_empty() {
            return false;
        }
        self.allergens = incoming;
        self.provenance.record(Field::Allergens, source);
        true
    }

    pub fn fill_description(&mut self, text: &str, source: DataSource) -> bool {
        let text = text.trim();
        if !self.description.is_empty() || text.is_empty() {
            return false;
        }
        self.description = text.to_string();
        self.provenance.record(Field::Description, source);
        true
    }

    pub fn fill_dietary_badges<I>(&mut self, badges: I, source: DataSource) -> bool
    where
        I: IntoIterator<Item = DietaryTag>,
    {
        if !self.dietary_badges.is_empty() {
            return false;
        }
        let incoming: BTreeSet<DietaryTag> = badges.into_iter().collect();
        if incoming.is_empty() {
            return false;
        }
        self.dietary_badges = incoming;
        self.provenance.record(Field::DietaryBadges, source);
        true
    }

    /// Recompute `icons` as the storefront subset of `dietary`.
    pub fn refresh_icons(&mut self) {
        self.icons = self
            .dietary
            .iter()
            .copied()
            .filter(|t| t.is_icon())
            .collect();
    }

    /// Text used as auxiliary evidence for dietary markers.
    #[must_use]
    pub fn marker_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.as_str(), self.description.as_str()];
        parts.extend(self.features.iter().map(String::as_str));
        parts.extend(self.certifications.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}
