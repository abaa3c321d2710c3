//! Selector-driven extraction of product facts from a fetched page.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and the
//! parsed document never outlives the call.

use std::sync::LazyLock;

use larder_core::{Nutrition, SelectorSet};
use larder_facts::{parse_nutrition, NutritionInput};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const DEFAULT_NAME: &[&str] = &["h1.product-title", "h1.product__title", "h1"];
const DEFAULT_INGREDIENTS: &[&str] = &[
    ".ingredients",
    "#ingredients",
    "[class*='ingredient']",
    ".product-ingredients",
    "#product-ingredients",
    "[data-ingredients]",
    ".ingredients-list",
];
const DEFAULT_NUTRITION: &[&str] = &[
    ".nutrition",
    "#nutrition",
    ".nutritional-info",
    ".nutrition-table",
    "#nutrition-facts",
    "table[class*='nutri']",
    "[class*='nutri']",
];
const DEFAULT_DESCRIPTION: &[&str] = &[
    ".product-description",
    "#product-description",
    ".description",
    "[itemprop='description']",
    ".product-body",
    ".product-info",
];
const DEFAULT_DIETARY: &[&str] = &[".dietary-badges", ".product-badges", ".dietary-info"];
const DEFAULT_ALLERGENS: &[&str] = &[".allergens", ".allergen-info", ".allergy-advice"];

/// Minimum length for label-matched ingredient text.
const MIN_INGREDIENTS_LEN: usize = 10;

static INGREDIENTS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bingredients?\s*[:\-]\s*(.+?)(?:\.\s|\.$|\s(?:nutrition(?:al)?|allergy|allergens?|storage|warnings?)\b|$)",
    )
    .expect("valid regex")
});
static INGREDIENTS_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ingredients?\s*[:\-]\s*").expect("valid regex"));
static BADGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span, img, li, div").expect("valid selector"));
static BOLD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong, b").expect("valid selector"));

/// Facts pulled from one product page. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub name: String,
    pub ingredients: String,
    pub nutrition: Nutrition,
    pub description: String,
    pub dietary_badges: Vec<String>,
    pub allergen_text: String,
}

impl ScrapedPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
            && self.nutrition.is_empty()
            && self.description.is_empty()
            && self.dietary_badges.is_empty()
            && self.allergen_text.is_empty()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn candidates<'a>(configured: &'a [String], defaults: &'a [&'a str]) -> Vec<&'a str> {
    if configured.is_empty() {
        defaults.to_vec()
    } else {
        configured.iter().map(String::as_str).collect()
    }
}

/// First element with text under the first selector that yields one.
fn first_match<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|raw| {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(selector = raw, error = ?e, "skipping invalid selector");
                return None;
            }
        };
        doc.select(&selector).find(|el| !element_text(el).is_empty())
    })
}

fn clean_ingredients(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    INGREDIENTS_PREFIX_RE
        .replace(&collapsed, "")
        .trim()
        .to_string()
}

/// "Ingredients: ..." anywhere in the page text.
fn ingredients_from_label(page_text: &str) -> Option<String> {
    let caps = INGREDIENTS_LABEL_RE.captures(page_text)?;
    let found = clean_ingredients(caps.get(1)?.as_str());
    (found.len() > MIN_INGREDIENTS_LEN).then_some(found)
}

fn badge_texts(el: &ElementRef<'_>) -> Vec<String> {
    let mut badges: Vec<String> = el
        .select(&BADGE_SELECTOR)
        .filter_map(|badge| {
            let text = element_text(&badge);
            if !text.is_empty() {
                return Some(text);
            }
            let value = badge.value();
            value
                .attr("alt")
                .or_else(|| value.attr("title"))
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
        })
        .collect();
    if badges.is_empty() {
        let text = element_text(el);
        if !text.is_empty() {
            badges.push(text);
        }
    }
    badges.dedup();
    badges
}

/// Extract facts from `html` using `selectors`, falling back to generic
/// selector lists for any field the configuration leaves empty.
#[must_use]
pub fn extract_page(html: &str, selectors: &SelectorSet) -> ScrapedPage {
    let doc = Html::parse_document(html);
    let mut page = ScrapedPage::default();

    if let Some(el) = first_match(&doc, &candidates(&selectors.name, DEFAULT_NAME)) {
        page.name = element_text(&el);
    }

    let ingredients_el = first_match(&doc, &candidates(&selectors.ingredients, DEFAULT_INGREDIENTS));
    if let Some(el) = &ingredients_el {
        page.ingredients = clean_ingredients(&element_text(el));
    }
    if page.ingredients.is_empty() {
        let page_text = element_text(&doc.root_element());
        if let Some(found) = ingredients_from_label(&page_text) {
            page.ingredients = found;
        }
    }

    page.nutrition = match first_match(&doc, &candidates(&selectors.nutrition, DEFAULT_NUTRITION)) {
        Some(el) => parse_nutrition(NutritionInput::Html(&el.html())),
        None => Nutrition::new(),
    };
    if page.nutrition.is_empty() {
        page.nutrition = parse_nutrition(NutritionInput::Html(html));
    }

    if let Some(el) = first_match(&doc, &candidates(&selectors.description, DEFAULT_DESCRIPTION)) {
        page.description = element_text(&el);
    }
    if let Some(el) = first_match(&doc, &candidates(&selectors.dietary, DEFAULT_DIETARY)) {
        page.dietary_badges = badge_texts(&el);
    }
    if let Some(el) = first_match(&doc, &candidates(&selectors.allergens, DEFAULT_ALLERGENS)) {
        page.allergen_text = element_text(&el);
    } else if let Some(el) = &ingredients_el {
        // UK labels embolden allergens inside the ingredient list.
        let bold: Vec<String> = el
            .select(&BOLD_SELECTOR)
            .map(|b| element_text(&b))
            .filter(|t| !t.is_empty())
            .collect();
        page.allergen_text = bold.join(", ");
    }

    page
}

/// Resolve the product page link on a search results page.
///
/// A link qualifies when its text or `href` contains any word longer than
/// three characters from `product_name`.
#[must_use]
pub fn find_product_link(
    html: &str,
    link_selectors: &[String],
    base_url: &str,
    product_name: &str,
) -> Option<String> {
    let keywords: Vec<String> = product_name
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        return None;
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    let doc = Html::parse_document(html);

    for raw in link_selectors {
        let Ok(selector) = Selector::parse(raw) else {
            tracing::debug!(selector = %raw, "skipping invalid link selector");
            continue;
        };
        for link in doc.select(&selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let text = element_text(&link).to_lowercase();
            let href_lower = href.to_lowercase();
            if keywords
                .iter()
                .any(|kw| text.contains(kw.as_str()) || href_lower.contains(kw.as_str()))
            {
                if let Ok(url) = base.join(href) {
                    return Some(url.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"
        <html><body>
          <h1 class="product-title">Organic Miso Paste</h1>
          <div class="product-description"><p>Traditionally fermented   for 18 months.</p></div>
          <div class="ingredients">Ingredients: Whole <b>soya</b> beans (45%), water, sea salt, koji.</div>
          <ul class="product-badges"><li>Organic</li><li><img alt="Vegan" src="v.png"></li></ul>
          <table class="nutrition-table">
            <tr><th>Typical values</th><th>Per 100g</th></tr>
            <tr><td>Energy</td><td>830kJ / 198kcal</td></tr>
            <tr><td>Fat</td><td>6.1g</td></tr>
            <tr><td>Protein</td><td>12g</td></tr>
            <tr><td>Salt</td><td>11.2g</td></tr>
          </table>
        </body></html>"#;

    #[test]
    fn default_selectors_extract_every_field() {
        let page = extract_page(PRODUCT_PAGE, &SelectorSet::default());
        assert_eq!(page.name, "Organic Miso Paste");
        assert_eq!(
            page.ingredients,
            "Whole soya beans (45%), water, sea salt, koji."
        );
        assert_eq!(page.description, "Traditionally fermented for 18 months.");
        assert_eq!(page.dietary_badges, ["Organic", "Vegan"]);
        assert_eq!(page.allergen_text, "soya");
        assert_eq!(page.nutrition.get("energy_kcal"), Some("198"));
        assert_eq!(page.nutrition.get("protein"), Some("12"));
    }

    #[test]
    fn configured_selectors_take_precedence() {
        let selectors = SelectorSet {
            description: vec!["#blurb".to_string()],
            ..SelectorSet::default()
        };
        let html = r#"<div id="blurb">Short blurb</div><div class="description">Other</div>"#;
        assert_eq!(extract_page(html, &selectors).description, "Short blurb");
    }

    #[test]
    fn ingredients_fall_back_to_label_text() {
        let html = "<p>Ingredients: Rolled oats, sunflower seeds, honey. Store in a cool place.</p>";
        let page = extract_page(html, &SelectorSet::default());
        assert_eq!(page.ingredients, "Rolled oats, sunflower seeds, honey");
    }

    #[test]
    fn product_link_matches_name_keywords() {
        let html = r#"
            <div class="product-item"><a href="/products/tamari">Tamari Soy Sauce</a></div>
            <div class="product-item"><a href="/products/organic-miso-paste">Miso</a></div>"#;
        let link = find_product_link(
            html,
            &[".product-item a".to_string()],
            "https://www.clearspring.co.uk",
            "Organic Miso Paste 300g",
        );
        assert_eq!(
            link.as_deref(),
            Some("https://www.clearspring.co.uk/products/organic-miso-paste")
        );
    }

    #[test]
    fn no_link_without_keyword_overlap() {
        let html = r#"<div class="product-item"><a href="/p/1">Rice Cakes</a></div>"#;
        assert!(find_product_link(
            html,
            &[".product-item a".to_string()],
            "https://example.com",
            "Miso Paste"
        )
        .is_none());
    }
}
