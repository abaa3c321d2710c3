use std::sync::LazyLock;

use regex::Regex;

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*ingredients?[:\s]*").expect("valid regex"));

static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;•·]").expect("valid regex"));

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*%[^)]*\)").expect("valid regex"));

static FOOTNOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*†‡§¹²³]+").expect("valid regex"));

/// Split raw ingredient text into individual ingredients.
///
/// Drops a leading `Ingredients:` label, percentage parentheticals such as
/// `(12%)`, footnote markers, and single-character fragments.
#[must_use]
pub fn parse_ingredients_list(text: &str) -> Vec<String> {
    let body = PREFIX_RE.replace(text, "");
    SPLIT_RE
        .split(&body)
        .map(|item| {
            let item = PERCENT_RE.replace_all(item, "");
            let item = FOOTNOTE_RE.replace_all(&item, "");
            item.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|item| item.chars().count() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_percentages_and_footnotes() {
        let items = parse_ingredients_list(
            "Ingredients: Organic Oats* (45%), Dates (30%); Cocoa² • Sea Salt",
        );
        assert_eq!(items, ["Organic Oats", "Dates", "Cocoa", "Sea Salt"]);
    }

    #[test]
    fn keeps_non_percentage_parentheticals() {
        let items = parse_ingredients_list("Chocolate (cocoa mass), Sugar");
        assert_eq!(items, ["Chocolate (cocoa mass)", "Sugar"]);
    }

    #[test]
    fn drops_single_character_fragments() {
        assert_eq!(parse_ingredients_list("Water, a, , Salt"), ["Water", "Salt"]);
        assert!(parse_ingredients_list("").is_empty());
    }
}
