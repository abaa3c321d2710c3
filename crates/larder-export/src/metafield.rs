//! Shopify metafield cell encodings.
//!
//! A malformed JSON cell rejects the whole Matrixify import, so every
//! encoder parses its own output back and degrades to an empty cell when
//! the result is not what Shopify expects.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Shopify's limit for one `single_line_text_field` entry.
pub const MAX_LIST_ENTRY_CHARS: usize = 255;

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|li|div|h[1-6])\s*>").expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));

fn list_entry(raw: &str) -> Option<String> {
    let entry: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_LIST_ENTRY_CHARS)
        .collect();
    let entry = entry.trim();
    (!entry.is_empty()).then(|| entry.to_owned())
}

/// Encode a `list.single_line_text_field` cell as a JSON array of strings.
///
/// Entries are trimmed, stripped of control characters and capped at
/// [`MAX_LIST_ENTRY_CHARS`]. No usable entry gives `""`, never `[]`.
#[must_use]
pub fn format_list_metafield<S: AsRef<str>>(items: &[S]) -> String {
    let cleaned: Vec<String> = items
        .iter()
        .filter_map(|item| list_entry(item.as_ref()))
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }

    let Ok(encoded) = serde_json::to_string(&cleaned) else {
        tracing::error!("list metafield failed to encode");
        return String::new();
    };
    match serde_json::from_str::<Vec<String>>(&encoded) {
        Ok(decoded) if decoded == cleaned => encoded,
        _ => {
            tracing::error!(cell = %encoded, "list metafield failed validation");
            String::new()
        }
    }
}

#[derive(Serialize)]
struct RichText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    children: Vec<Paragraph<'a>>,
}

#[derive(Serialize)]
struct Paragraph<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    children: [TextNode<'a>; 1],
}

#[derive(Serialize)]
struct TextNode<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

fn is_valid_rich_text(encoded: &str) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(encoded) else {
        return false;
    };
    value.get("type").and_then(Value::as_str) == Some("root")
        && value
            .get("children")
            .and_then(Value::as_array)
            .is_some_and(|children| !children.is_empty())
}

/// Encode a `rich_text_field` cell as a Shopify rich-text document with
/// one paragraph per non-empty line.
///
/// Block-level closing tags and `<br>` become line breaks, then the
/// remaining HTML tags are removed since the field cannot hold raw HTML.
#[must_use]
pub fn format_rich_text_metafield(text: &str) -> String {
    let broken = BREAK_RE.replace_all(text, "\n");
    let plain = TAG_RE.replace_all(&broken, " ");
    let lines: Vec<String> = plain
        .lines()
        .map(|line| {
            let line: String = line.chars().filter(|c| !c.is_control()).collect();
            SPACES_RE.replace_all(&line, " ").trim().to_owned()
        })
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return String::new();
    }

    let doc = RichText {
        kind: "root",
        children: lines
            .iter()
            .map(|line| Paragraph {
                kind: "paragraph",
                children: [TextNode {
                    kind: "text",
                    value: line,
                }],
            })
            .collect(),
    };
    let Ok(encoded) = serde_json::to_string(&doc) else {
        tracing::error!("rich text metafield failed to encode");
        return String::new();
    };
    if !is_valid_rich_text(&encoded) {
        tracing::error!(cell = %encoded, "rich text metafield failed validation");
        return String::new();
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_round_trips_through_json() {
        let cell = format_list_metafield(&["Vegan", "Gluten Free"]);
        let parsed: Vec<String> = serde_json::from_str(&cell).unwrap();
        assert_eq!(parsed, ["Vegan", "Gluten Free"]);
    }

    #[test]
    fn empty_list_is_empty_cell() {
        assert_eq!(format_list_metafield::<&str>(&[]), "");
        assert_eq!(format_list_metafield(&["  ", "\u{7}"]), "");
    }

    #[test]
    fn list_entries_are_cleaned_and_capped() {
        let long = "x".repeat(300);
        let cell = format_list_metafield(&[" Palm \"Oil\" Free\t", long.as_str(), "Café"]);
        let parsed: Vec<String> = serde_json::from_str(&cell).unwrap();
        assert_eq!(parsed[0], "Palm \"Oil\" Free");
        assert_eq!(parsed[1].chars().count(), MAX_LIST_ENTRY_CHARS);
        assert_eq!(parsed[2], "Café");
    }

    #[test]
    fn rich_text_has_one_paragraph_per_line() {
        let cell = format_rich_text_metafield("Line one\nLine two");
        let doc: Value = serde_json::from_str(&cell).unwrap();
        assert_eq!(doc["type"], "root");
        let children = doc["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        for (child, expected) in children.iter().zip(["Line one", "Line two"]) {
            assert_eq!(child["type"], "paragraph");
            let text = child["children"].as_array().unwrap();
            assert_eq!(text.len(), 1);
            assert_eq!(text[0]["type"], "text");
            assert_eq!(text[0]["value"], expected);
        }
    }

    #[test]
    fn html_paragraphs_and_breaks_become_separate_paragraphs() {
        let cell = format_rich_text_metafield(
            "<p>Store cool.</p><p>Once opened<br/>use within 3 days.</p>",
        );
        let doc: Value = serde_json::from_str(&cell).unwrap();
        let values: Vec<&str> = doc["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["children"][0]["value"].as_str().unwrap())
            .collect();
        assert_eq!(values, ["Store cool.", "Once opened", "use within 3 days."]);
    }

    #[test]
    fn rich_text_strips_html_and_blank_input() {
        let cell = format_rich_text_metafield("Water, <b>soya</b>  beans");
        let doc: Value = serde_json::from_str(&cell).unwrap();
        assert_eq!(doc["children"][0]["children"][0]["value"], "Water, soya beans");
        assert_eq!(format_rich_text_metafield("<p> </p>"), "");
        assert_eq!(format_rich_text_metafield(""), "");
    }
}
