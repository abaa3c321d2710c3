/// URL-safe handle for a product title.
///
/// Lowercases, drops apostrophes, spells `&` as `and`, turns whitespace and
/// underscores into hyphens, strips everything else outside `[a-z0-9-]`,
/// collapses hyphen runs and trims edge hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase().replace(['\'', '\u{2019}'], "").replace('&', "and");

    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let mapped = if c.is_whitespace() || c == '_' || c == '-' {
            '-'
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            continue;
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_handles_punctuation_and_ampersands() {
        assert_eq!(slugify("Mum's Fish & Chips"), "mums-fish-and-chips");
        assert_eq!(slugify("  Oat_Drink -- Barista (1L) "), "oat-drink-barista-1l");
        assert_eq!(slugify("Café Noir"), "caf-noir");
        assert_eq!(slugify(""), "");
    }
}
