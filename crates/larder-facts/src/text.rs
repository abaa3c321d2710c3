//! Small text primitives shared by the rule engines.

/// Returns `true` if `term` occurs in `haystack` on word boundaries.
///
/// Both inputs must be pre-lowercased. A trailing plural `s`/`es` on the
/// haystack side is tolerated, so `"peanut"` matches `"coated peanuts"`
/// while `"oat"` never matches inside `"coated"`.
#[must_use]
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let mut search_from = 0usize;
    while let Some(rel) = haystack[search_from..].find(term) {
        let start = search_from + rel;
        let end = start + term.len();

        let before_ok = !haystack[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);

        let rest = &haystack[end..];
        let boundary_at = |tail: &str| !tail.chars().next().is_some_and(char::is_alphanumeric);
        let after_ok = boundary_at(rest)
            || rest.strip_prefix("es").is_some_and(boundary_at)
            || rest.strip_prefix('s').is_some_and(boundary_at);

        if before_ok && after_ok {
            return true;
        }
        search_from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Capitalise the first letter of each whitespace-separated word and
/// lowercase the rest.
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_must_sit_on_word_boundaries() {
        assert!(!contains_term("coated almonds", "oat"));
        assert!(contains_term("rolled oat flakes", "oat"));
        assert!(!contains_term("chamomile", "ham"));
        assert!(contains_term("smoked ham, salt", "ham"));
    }

    #[test]
    fn plural_suffix_is_tolerated() {
        assert!(contains_term("coated peanuts", "peanut"));
        assert!(contains_term("free range eggs", "egg"));
        assert!(contains_term("tomatoes", "tomato"));
        assert!(!contains_term("eggshells", "egg"));
    }

    #[test]
    fn multi_word_terms_match() {
        assert!(contains_term("water, brewer's yeast, salt", "brewer's yeast"));
        assert!(contains_term("contains sulphur dioxide.", "sulphur dioxide"));
    }

    #[test]
    fn later_occurrence_is_found_after_rejected_one() {
        assert!(contains_term("coated oat bar", "oat"));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("tree NUTS"), "Tree Nuts");
        assert_eq!(title_case("  sesame  seeds "), "Sesame Seeds");
        assert_eq!(title_case(""), "");
    }
}
