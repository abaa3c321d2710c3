//! Post-generation clean-up of model output.

use std::sync::LazyLock;

use larder_core::Descriptions;
use regex::Regex;

/// Longest short description before a warning is logged.
pub const SHORT_MAX_CHARS: usize = 150;
/// Longest body before a warning is logged.
pub const BODY_MAX_CHARS: usize = 2000;

/// Phrases never allowed in product copy: the store's own name, guilt
/// messaging, competitor references and vague sourcing.
pub const FORBIDDEN_PHRASES: [&str; 11] = [
    "Earthfare",
    "save the planet",
    "you should",
    "you must",
    "conventional",
    "supermarket",
    "mass-produced",
    "Sainsbury",
    "Marks and Spencer",
    "Tesco",
    "imported from",
];

static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FORBIDDEN_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})(?:'s)?\b")).expect("valid regex")
});

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").expect("valid regex")
});

static EMPTY_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p>(?:\s|&nbsp;|<br\s*/?>)*</p>").expect("valid regex"));

static PARAGRAPH_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(<p(?:\s[^>]*)?>)\s+").expect("valid regex"));

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +([.,;:!?])").expect("valid regex"));

/// Remove forbidden phrases case-insensitively and tidy the spacing left
/// behind.
#[must_use]
pub fn strip_forbidden_phrases(text: &str) -> String {
    let stripped = FORBIDDEN_RE.replace_all(text, "");
    let collapsed = SPACE_RUN_RE.replace_all(&stripped, " ");
    SPACE_BEFORE_PUNCT_RE
        .replace_all(&collapsed, "$1")
        .trim()
        .to_owned()
}

/// Drop `<script>`/`<style>` blocks and empty paragraphs, and trim the
/// whitespace at the start of each paragraph.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let without_code = SCRIPT_STYLE_RE.replace_all(html, "");
    let without_empty = EMPTY_P_RE.replace_all(&without_code, "");
    PARAGRAPH_LEAD_RE
        .replace_all(&without_empty, "$1")
        .trim()
        .to_owned()
}

fn clean(text: &str) -> String {
    sanitize_html(&strip_forbidden_phrases(text))
}

/// Clean every generated text field and warn about over-long copy.
pub fn sanitize_descriptions(descriptions: &mut Descriptions, product_name: &str) {
    descriptions.title = clean(&descriptions.title);
    descriptions.body_html = clean(&descriptions.body_html);
    descriptions.short_description = clean(&descriptions.short_description);
    descriptions.meta_description = clean(&descriptions.meta_description);

    let short_len = descriptions.short_description.chars().count();
    if short_len > SHORT_MAX_CHARS {
        tracing::warn!(product = product_name, chars = short_len, "short description too long");
    }
    let body_len = descriptions.body_html.chars().count();
    if body_len > BODY_MAX_CHARS {
        tracing::warn!(product = product_name, chars = body_len, "long description too long");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_phrases_are_removed_case_insensitively() {
        assert_eq!(
            strip_forbidden_phrases("Better than any SUPERMARKET loaf, you should try it."),
            "Better than any loaf, try it."
        );
        assert_eq!(strip_forbidden_phrases("Loved at Earthfare's deli"), "Loved at deli");
    }

    #[test]
    fn words_containing_a_phrase_are_kept() {
        assert_eq!(
            strip_forbidden_phrases("Unconventional flavours"),
            "Unconventional flavours"
        );
    }

    #[test]
    fn scripts_styles_and_empty_paragraphs_are_dropped() {
        let html = "<p>Rich cocoa.</p><script>alert(1)</script><p> </p><style>p{}</style><p>Vegan.</p>";
        assert_eq!(sanitize_html(html), "<p>Rich cocoa.</p><p>Vegan.</p>");
    }

    #[test]
    fn descriptions_are_cleaned_in_place() {
        let mut d = Descriptions {
            title: "Tesco Style Oats".into(),
            body_html: "<p></p><p>Save the planet with oats.</p>".into(),
            ..Descriptions::default()
        };
        sanitize_descriptions(&mut d, "Oats");
        assert_eq!(d.title, "Style Oats");
        assert_eq!(d.body_html, "<p>with oats.</p>");
    }
}
