//! Barcode normalisation.
//!
//! Spreadsheet round-trips mangle EANs into `5.06E+12`, `5060000000000.0`
//! or drop the leading zero of a 13-digit code. Every form is folded back
//! into a plain digit string here, once, at ingestion.

use std::sync::LazyLock;

use regex::Regex;

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 14;
const EAN13_LEN: usize = 13;

static SCIENTIFIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:[.,](\d+))?[eE]\+?(\d{1,2})$").expect("valid regex")
});

static FLOAT_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.,]0+$").expect("valid regex"));

/// Expand `5.06E+12` to `5060000000000` without going through `f64`.
///
/// Spreadsheets in comma-decimal locales write the same value as `5,06E+12`.
fn expand_scientific(raw: &str) -> Option<String> {
    let caps = SCIENTIFIC_RE.captures(raw)?;
    let int_part = &caps[1];
    let frac_part = caps.get(2).map_or("", |m| m.as_str());
    let exponent: usize = caps[3].parse().ok()?;

    let mut digits = String::with_capacity(int_part.len() + exponent);
    digits.push_str(int_part);
    if exponent >= frac_part.len() {
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat_n('0', exponent - frac_part.len()));
    } else {
        digits.push_str(&frac_part[..exponent]);
    }
    Some(digits)
}

/// Normalise a raw barcode cell to a digit string.
///
/// - scientific notation and trailing `.0` are expanded/stripped;
/// - separators and any other non-digits are dropped;
/// - a 12-digit result is left-padded to EAN-13.
///
/// A result outside 8–14 digits is still returned so the bad value stays
/// visible; input with no digits at all yields `""`. The function is
/// idempotent.
#[must_use]
pub fn clean_barcode(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let digits: String = if let Some(expanded) = expand_scientific(trimmed) {
        expanded
    } else {
        let body = FLOAT_TAIL_RE
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map_or(trimmed, |m| m.as_str());
        body.chars().filter(char::is_ascii_digit).collect()
    };

    if digits.len() == EAN13_LEN - 1 {
        return format!("0{digits}");
    }
    digits
}

/// `true` for an 8–14 digit string.
#[must_use]
pub fn is_valid_barcode(barcode: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&barcode.len()) && barcode.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_notation_expands_to_digits() {
        assert_eq!(clean_barcode("5.06E+12"), "5060000000000");
        assert_eq!(clean_barcode("5.030009999999e12"), "5030009999999");
    }

    #[test]
    fn comma_decimal_scientific_notation_expands() {
        assert_eq!(clean_barcode("5,06E+12"), "5060000000000");
        assert_eq!(clean_barcode("5,030009999999E+12"), "5030009999999");
        assert_eq!(clean_barcode("5030009999999,0"), "5030009999999");
    }

    #[test]
    fn float_tail_and_separators_are_removed() {
        assert_eq!(clean_barcode("5030009999999.0"), "5030009999999");
        assert_eq!(clean_barcode("5 030009-999999"), "5030009999999");
    }

    #[test]
    fn twelve_digits_recover_leading_zero() {
        assert_eq!(clean_barcode("761234567890"), "0761234567890");
        assert!(is_valid_barcode(&clean_barcode("761234567890")));
    }

    #[test]
    fn representations_of_one_ean_agree() {
        let forms = ["5.03E+12", "5030000000000", "5030000000000.0", " 5030000000000 "];
        let cleaned: Vec<String> = forms.iter().map(|f| clean_barcode(f)).collect();
        assert!(cleaned.iter().all(|c| c == "5030000000000"), "{cleaned:?}");
    }

    #[test]
    fn cleaning_is_idempotent() {
        for raw in ["5.06E+12", "761234567890", "12-34", "ABC", "", "501234567890123456"] {
            let once = clean_barcode(raw);
            assert_eq!(clean_barcode(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn out_of_range_is_kept_and_non_numeric_is_empty() {
        assert_eq!(clean_barcode("12-34"), "1234");
        assert!(!is_valid_barcode("1234"));
        assert_eq!(clean_barcode("not a barcode"), "");
    }
}
