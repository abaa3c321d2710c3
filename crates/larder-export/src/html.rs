//! HTML shaping for description cells.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(|line| SPACES_RE.replace_all(line, " ").trim().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

/// Drop HTML comments such as `<!--image-->` and tidy spacing. Line
/// breaks survive so list-style text can still be re-wrapped.
#[must_use]
pub fn clean_text(text: &str) -> String {
    tidy_lines(&COMMENT_RE.replace_all(text, ""))
}

/// Short description as one paragraph: non-empty lines joined with `<br>`.
/// Text that is already a paragraph is returned unchanged.
#[must_use]
pub fn format_short_description_html(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text.starts_with("<p") {
        return text.to_owned();
    }
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    format!("<p>{}</p>", lines.join("<br>"))
}

/// Long description as paragraphs split on blank lines. Text that already
/// contains paragraphs is returned unchanged.
#[must_use]
pub fn format_long_description_html(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text.to_ascii_lowercase().contains("<p") {
        return text.to_owned();
    }
    BLANK_LINES_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", p.replace('\n', " ")))
        .collect()
}

/// Plain text for spreadsheet cells: breaks become newlines, other tags go,
/// and the common entities are decoded.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(html, "\n");
    let plain = TAG_RE.replace_all(&with_breaks, " ");
    let decoded = plain
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    tidy_lines(&decoded)
        .lines()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_removed_and_lines_kept() {
        assert_eq!(
            clean_text("Fresh  bread<!--image-->\n  Baked daily "),
            "Fresh bread\nBaked daily"
        );
    }

    #[test]
    fn short_description_joins_lines_once() {
        assert_eq!(
            format_short_description_html("Grown in Peru\n\nComplete protein\nVersatile"),
            "<p>Grown in Peru<br>Complete protein<br>Versatile</p>"
        );
        assert_eq!(
            format_short_description_html("<p>Already<br>done</p>"),
            "<p>Already<br>done</p>"
        );
    }

    #[test]
    fn long_description_wraps_each_paragraph() {
        assert_eq!(
            format_long_description_html("First part\nstill first\n\nSecond"),
            "<p>First part still first</p><p>Second</p>"
        );
        assert_eq!(format_long_description_html("<p>Kept</p>"), "<p>Kept</p>");
        assert_eq!(format_long_description_html(""), "");
    }

    #[test]
    fn strip_html_keeps_line_structure() {
        assert_eq!(
            strip_html("<p>Nutty &amp; fluffy<br>Vegan</p><p>Made in UK.</p>"),
            "Nutty & fluffy\nVegan\nMade in UK."
        );
    }
}
