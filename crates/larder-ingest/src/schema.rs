//! Headered vs. positional input detection.

use std::sync::LazyLock;

use regex::Regex;

const HEADER_KEYWORDS: [&str; 13] = [
    "name",
    "sku",
    "code",
    "description",
    "brand",
    "barcode",
    "ean",
    "title",
    "product",
    "category",
    "price",
    "weight",
    "image",
];

/// Either score must reach this to decide the layout.
const DECISIVE_SCORE: usize = 2;

/// Shortest all-digit cell that counts as data rather than a label.
const MIN_DIGIT_RUN: usize = 4;

static SCIENTIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?[eE][+-]?\d+$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Headered,
    Headerless,
}

fn looks_like_data(cell: &str) -> bool {
    let cell = cell.trim();
    let all_digits = cell.len() >= MIN_DIGIT_RUN && cell.bytes().all(|b| b.is_ascii_digit());
    all_digits
        || SCIENTIFIC_RE.is_match(cell)
        || cell.eq_ignore_ascii_case("yes")
        || cell.eq_ignore_ascii_case("no")
}

/// Classify a first row as a header row or a data row.
///
/// Two or more keyword-bearing cells mean headered; otherwise two or more
/// data-looking cells mean headerless. Anything else defaults to headered,
/// where unknown keys just leave fields empty.
#[must_use]
pub fn detect_schema<S: AsRef<str>>(first_row: &[S]) -> Schema {
    let keyword_score = first_row
        .iter()
        .filter(|cell| {
            let lower = cell.as_ref().to_lowercase();
            HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .count();
    if keyword_score >= DECISIVE_SCORE {
        return Schema::Headered;
    }

    let data_score = first_row
        .iter()
        .filter(|cell| looks_like_data(cell.as_ref()))
        .count();
    if data_score >= DECISIVE_SCORE {
        Schema::Headerless
    } else {
        Schema::Headered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_row_is_headered() {
        assert_eq!(detect_schema(&["SKU", "Description", "Barcode"]), Schema::Headered);
    }

    #[test]
    fn data_row_is_headerless() {
        let row = ["37136", "5030009999999", "Ainsworths Organic Soup", "Yes", "No"];
        assert_eq!(detect_schema(&row), Schema::Headerless);
    }

    #[test]
    fn scientific_barcode_counts_as_data() {
        assert_eq!(detect_schema(&["5.03E+12", "yes", "Soup"]), Schema::Headerless);
    }

    #[test]
    fn ambiguous_row_defaults_to_headered() {
        assert_eq!(detect_schema(&["Foo", "Bar", "12"]), Schema::Headered);
        assert_eq!(detect_schema::<&str>(&[]), Schema::Headered);
    }
}
