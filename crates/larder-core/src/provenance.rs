//! Per-field source tracking for enriched product data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fields whose origin is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Ingredients,
    Nutrition,
    Allergens,
    Description,
    DietaryBadges,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Ingredients => "ingredients",
            Field::Nutrition => "nutrition",
            Field::Allergens => "allergens",
            Field::Description => "description",
            Field::DietaryBadges => "dietary_badges",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust class of a scraped website, from most to least reliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Manufacturer,
    Big4Supplier,
    SpecialtyRetailer,
    Supermarket,
    Marketplace,
}

impl SourceTier {
    /// Merge weight used when several scraped results supply the same field.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            SourceTier::Manufacturer => 1.0,
            SourceTier::Big4Supplier => 0.9,
            SourceTier::SpecialtyRetailer => 0.7,
            SourceTier::Supermarket => 0.5,
            SourceTier::Marketplace => 0.1,
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTier::Manufacturer => write!(f, "manufacturer"),
            SourceTier::Big4Supplier => write!(f, "big4_supplier"),
            SourceTier::SpecialtyRetailer => write!(f, "specialty_retailer"),
            SourceTier::Supermarket => write!(f, "supermarket"),
            SourceTier::Marketplace => write!(f, "marketplace"),
        }
    }
}

/// Where a field value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    OpenFoodFacts,
    BrandWebsite,
    /// A supplier or fallback site, identified by its display name.
    Scraped(String),
}

impl DataSource {
    /// Relative trust; the pipeline stage order follows the same ranking.
    #[must_use]
    pub fn trust(&self) -> u8 {
        match self {
            DataSource::Csv => 4,
            DataSource::OpenFoodFacts => 3,
            DataSource::BrandWebsite => 2,
            DataSource::Scraped(_) => 1,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Csv => "csv",
            DataSource::OpenFoodFacts => "openfoodfacts",
            DataSource::BrandWebsite => "brand_website",
            DataSource::Scraped(_) => "scraped",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Side-map of `field -> source` for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(BTreeMap<Field, DataSource>);

impl Provenance {
    /// Record `source` for `field`.
    ///
    /// An existing label is only replaced by a strictly more trusted source.
    /// Returns `false` when the existing label was kept.
    pub fn record(&mut self, field: Field, source: DataSource) -> bool {
        if let Some(existing) = self.0.get(&field) {
            if existing.trust() >= source.trust() {
                tracing::debug!(
                    field = %field,
                    existing = %existing,
                    rejected = %source,
                    "keeping existing provenance"
                );
                return false;
            }
        }
        self.0.insert(field, source);
        true
    }

    #[must_use]
    pub fn source_of(&self, field: Field) -> Option<&DataSource> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &DataSource)> {
        self.0.iter().map(|(f, s)| (*f, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_trust_source_never_replaces_label() {
        let mut p = Provenance::default();
        assert!(p.record(Field::Nutrition, DataSource::Csv));
        assert!(!p.record(Field::Nutrition, DataSource::OpenFoodFacts));
        assert!(!p.record(Field::Nutrition, DataSource::Scraped("Ocado".into())));
        assert_eq!(p.source_of(Field::Nutrition), Some(&DataSource::Csv));
    }

    #[test]
    fn equal_trust_source_keeps_first_label() {
        let mut p = Provenance::default();
        p.record(Field::Ingredients, DataSource::Scraped("Suma".into()));
        p.record(Field::Ingredients, DataSource::Scraped("Ocado".into()));
        assert_eq!(
            p.source_of(Field::Ingredients),
            Some(&DataSource::Scraped("Suma".into()))
        );
    }

    #[test]
    fn higher_trust_source_upgrades_label() {
        let mut p = Provenance::default();
        p.record(Field::Allergens, DataSource::BrandWebsite);
        assert!(p.record(Field::Allergens, DataSource::OpenFoodFacts));
        assert_eq!(p.source_of(Field::Allergens), Some(&DataSource::OpenFoodFacts));
    }

    #[test]
    fn labels_render_as_source_tags() {
        assert_eq!(DataSource::Csv.to_string(), "csv");
        assert_eq!(DataSource::OpenFoodFacts.to_string(), "openfoodfacts");
        assert_eq!(DataSource::Scraped("Waitrose".into()).to_string(), "scraped");
        assert_eq!(SourceTier::Big4Supplier.to_string(), "big4_supplier");
    }

    #[test]
    fn tier_weights_are_strictly_ordered() {
        let tiers = [
            SourceTier::Manufacturer,
            SourceTier::Big4Supplier,
            SourceTier::SpecialtyRetailer,
            SourceTier::Supermarket,
            SourceTier::Marketplace,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].weight() > pair[1].weight());
        }
    }
}
