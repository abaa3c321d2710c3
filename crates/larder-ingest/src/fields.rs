//! Alias-probing field extraction over semi-structured rows.

use crate::error::IngestError;

/// Values that mean "no data" regardless of the column.
const EMPTY_SENTINELS: [&str; 3] = ["n/a", "none", "null"];

/// Strings longer than this are split on commas when no `|` or `;` is present.
const COMMA_SPLIT_MIN_LEN: usize = 50;

/// One input record as ordered `(key, value)` pairs, keys and values trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_string(), v.as_ref().trim().to_string()))
                .collect(),
        }
    }

    /// Value stored under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.cells
    }
}

fn usable(value: &str) -> Option<&str> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    if value.is_empty() || EMPTY_SENTINELS.contains(&lower.as_str()) {
        None
    } else {
        Some(value)
    }
}

/// First usable value among `candidates`, or `""`.
///
/// Each candidate is tried as an exact key, then case-insensitively, before
/// moving to the next one, so caller order expresses priority.
#[must_use]
pub fn extract(row: &Row, candidates: &[&str]) -> String {
    candidates
        .iter()
        .find_map(|key| {
            row.get(key)
                .and_then(usable)
                .or_else(|| row.get_ignore_case(key).and_then(usable))
        })
        .unwrap_or_default()
        .to_string()
}

/// Like [`extract`], but absence is an error.
///
/// # Errors
///
/// Returns [`IngestError::MissingField`] when no candidate yields a value.
pub fn extract_required(row: &Row, candidates: &[&str]) -> Result<String, IngestError> {
    let value = extract(row, candidates);
    if value.is_empty() {
        Err(IngestError::MissingField {
            candidates: candidates.join(", "),
        })
    } else {
        Ok(value)
    }
}

/// Split a list-like cell: on `|`, else `;`, else `,` for long strings.
#[must_use]
pub fn parse_list_field(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }
    let separator = if value.contains('|') {
        Some('|')
    } else if value.contains(';') {
        Some(';')
    } else if value.contains(',') && value.len() > COMMA_SPLIT_MIN_LEN {
        Some(',')
    } else {
        None
    };
    match separator {
        Some(sep) => value
            .split(sep)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![value.to_string()],
    }
}

/// [`parse_list_field`] over the first usable candidate column.
#[must_use]
pub fn extract_list(row: &Row, candidates: &[&str]) -> Vec<String> {
    parse_list_field(&extract(row, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn candidate_order_is_priority_order() {
        let r = row(&[("name", "Generic"), ("Description", "Organic Quinoa")]);
        assert_eq!(extract(&r, &["Description", "name"]), "Organic Quinoa");
    }

    #[test]
    fn sentinels_are_skipped() {
        let r = row(&[("Brand", "N/A"), ("manufacturer", "Suma")]);
        assert_eq!(extract(&r, &["Brand", "manufacturer"]), "Suma");
        let r = row(&[("Brand", "null")]);
        assert_eq!(extract(&r, &["Brand"]), "");
    }

    #[test]
    fn keys_match_case_insensitively_and_trimmed() {
        let r = row(&[("Description ", " Oat Milk ")]);
        assert_eq!(extract(&r, &["description"]), "Oat Milk");
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let r = row(&[("Code", "Q123")]);
        assert!(matches!(
            extract_required(&r, &["Description", "name"]),
            Err(IngestError::MissingField { .. })
        ));
    }

    #[test]
    fn list_fields_prefer_pipes_then_semicolons() {
        assert_eq!(parse_list_field("a | b |"), ["a", "b"]);
        assert_eq!(parse_list_field("a; b, c"), ["a", "b, c"]);
    }

    #[test]
    fn short_comma_strings_stay_whole() {
        assert_eq!(parse_list_field("Salt, Pepper"), ["Salt, Pepper"]);
        let long = "Rich in fibre, High in protein, Source of iron, Low in saturated fat";
        assert_eq!(parse_list_field(long).len(), 4);
        assert!(parse_list_field("  ").is_empty());
    }
}
