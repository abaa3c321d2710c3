//! Per-field weighted merge of scraped results.

use larder_core::{DataSource, Nutrition};

use crate::scrape::ScrapeResult;

/// A field value and the source that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

/// Best value per field across all scraped results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedScrape {
    pub ingredients: Option<Sourced<String>>,
    pub nutrition: Option<Sourced<Nutrition>>,
    pub description: Option<Sourced<String>>,
    pub dietary_badges: Option<Sourced<Vec<String>>>,
    pub allergen_text: Option<Sourced<String>>,
}

fn pick<T: Clone>(
    ranked: &[&ScrapeResult],
    field: impl Fn(&ScrapeResult) -> Option<&T>,
) -> Option<Sourced<T>> {
    ranked.iter().find_map(|result| {
        field(*result).map(|value| Sourced {
            value: value.clone(),
            source: result.source.clone(),
        })
    })
}

/// Keep, for every field, the non-empty value from the highest-weighted
/// source tier. Equal weights keep the earlier result.
#[must_use]
pub fn merge_scraped(results: &[ScrapeResult]) -> MergedScrape {
    let mut ranked: Vec<&ScrapeResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.tier.weight().total_cmp(&a.tier.weight()));

    MergedScrape {
        ingredients: pick(&ranked, |r| Some(&r.page.ingredients).filter(|s| !s.is_empty())),
        nutrition: pick(&ranked, |r| Some(&r.page.nutrition).filter(|n| !n.is_empty())),
        description: pick(&ranked, |r| Some(&r.page.description).filter(|s| !s.is_empty())),
        dietary_badges: pick(&ranked, |r| {
            Some(&r.page.dietary_badges).filter(|b| !b.is_empty())
        }),
        allergen_text: pick(&ranked, |r| {
            Some(&r.page.allergen_text).filter(|s| !s.is_empty())
        }),
    }
}

#[cfg(test)]
mod tests {
    use larder_core::SourceTier;

    use super::*;
    use crate::extract::ScrapedPage;

    fn result(site: &str, tier: SourceTier, ingredients: &str, description: &str) -> ScrapeResult {
        ScrapeResult {
            page: ScrapedPage {
                ingredients: ingredients.into(),
                description: description.into(),
                ..ScrapedPage::default()
            },
            source: DataSource::Scraped(site.into()),
            tier,
        }
    }

    #[test]
    fn highest_weight_wins_regardless_of_order() {
        let results = [
            result("Ocado", SourceTier::Supermarket, "Oats, salt", "Ocado copy"),
            result("Infinity Foods", SourceTier::Big4Supplier, "Oats", ""),
        ];
        let merged = merge_scraped(&results);
        let ingredients = merged.ingredients.unwrap();
        assert_eq!(ingredients.value, "Oats");
        assert_eq!(ingredients.source, DataSource::Scraped("Infinity Foods".into()));
        // The supplier had no description, so the lower tier supplies it.
        assert_eq!(merged.description.unwrap().value, "Ocado copy");
        assert!(merged.nutrition.is_none());
    }

    #[test]
    fn equal_weights_keep_first_result() {
        let results = [
            result("Holland & Barrett", SourceTier::SpecialtyRetailer, "A", ""),
            result("Planet Organic", SourceTier::SpecialtyRetailer, "B", ""),
        ];
        assert_eq!(merge_scraped(&results).ingredients.unwrap().value, "A");
    }

    #[test]
    fn empty_input_merges_to_nothing() {
        assert_eq!(merge_scraped(&[]), MergedScrape::default());
    }
}
