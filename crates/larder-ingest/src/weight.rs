//! Weight and volume parsing from free-text cells.

/// Units recognised for weight, longest first so `"kg"` wins over `"g"`.
const WEIGHT_UNITS: [&str; 6] = ["kilograms", "kilogram", "grams", "gram", "kg", "g"];

/// Units recognised for volume, longest first.
const VOLUME_UNITS: [&str; 7] = ["litres", "liters", "litre", "liter", "ml", "cl", "l"];

/// Scans `lower` for the first number followed (after optional spaces) by
/// one of `units` ending on a word boundary. Input must be pre-lowercased.
fn scan_quantity(lower: &str, units: &[&'static str]) -> Option<(f64, &'static str)> {
    let bytes = lower.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    while i < len {
        if bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && i + 1 < len && bytes[i + 1].is_ascii_digit())
        {
            let num_start = i;
            let mut has_dot = false;
            while i < len && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !has_dot)) {
                if bytes[i] == b'.' {
                    has_dot = true;
                }
                i += 1;
            }
            let num_str = &lower[num_start..i];

            let mut j = i;
            while j < len && bytes[j] == b' ' {
                j += 1;
            }

            let rest = &lower[j..];
            let unit = units.iter().copied().find(|unit| {
                rest.strip_prefix(*unit)
                    .is_some_and(|tail| !tail.chars().next().is_some_and(char::is_alphanumeric))
            });
            if let (Some(unit), Ok(value)) = (unit, num_str.parse::<f64>()) {
                return Some((value, unit));
            }
        } else {
            i += 1;
        }
    }
    None
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX))
        .then(|| value.round() as u32)
}

/// `"2.5kg"` → 2500, `"500 g"` → 500. `None` when no weight is present.
#[must_use]
pub fn parse_weight_to_grams(text: &str) -> Option<u32> {
    let (value, unit) = scan_quantity(&text.to_lowercase(), &WEIGHT_UNITS)?;
    if unit.starts_with('k') {
        to_u32(value * 1000.0)
    } else {
        to_u32(value)
    }
}

/// Parse a bare number of kilograms (`"1.25"`) to grams.
#[must_use]
pub fn kilograms_to_grams(text: &str) -> Option<u32> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().and_then(|kg| to_u32(kg * 1000.0))
}

/// Parse a bare gram count (`"500"`, `"500.0"`).
#[must_use]
pub fn parse_grams(text: &str) -> Option<u32> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().and_then(to_u32)
}

/// `500` → `"500g"`, `2500` → `"2.50kg"`.
#[must_use]
pub fn human_weight(grams: u32) -> String {
    if grams >= 1000 {
        format!("{:.2}kg", f64::from(grams) / 1000.0)
    } else {
        format!("{grams}g")
    }
}

fn trim_number(value: f64) -> String {
    let s = format!("{value:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Normalise a volume to `ml` below one litre and `L` at or above it:
/// `"50cl"` → `"500ml"`, `"0.5 l"` → `"500ml"`, `"1500ml"` → `"1.5L"`.
/// Text without a recognisable volume is returned trimmed.
#[must_use]
pub fn normalize_volume(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let Some((value, unit)) = scan_quantity(&lower, &VOLUME_UNITS) else {
        return text.trim().to_string();
    };
    let ml = match unit {
        "ml" => value,
        "cl" => value * 10.0,
        _ => value * 1000.0,
    };
    if ml >= 1000.0 {
        format!("{}L", trim_number(ml / 1000.0))
    } else {
        format!("{}ml", trim_number(ml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_units_convert_to_grams() {
        assert_eq!(parse_weight_to_grams("2.5kg"), Some(2500));
        assert_eq!(parse_weight_to_grams("Net weight: 500 g"), Some(500));
        assert_eq!(parse_weight_to_grams("1.2 Kilograms"), Some(1200));
        assert_eq!(parse_weight_to_grams("12 bags"), None);
    }

    #[test]
    fn unit_needs_word_boundary() {
        assert_eq!(parse_weight_to_grams("4 granola bars"), None);
    }

    #[test]
    fn bare_numbers_parse() {
        assert_eq!(kilograms_to_grams("1.25"), Some(1250));
        assert_eq!(parse_grams("500.0"), Some(500));
        assert_eq!(parse_grams("abc"), None);
    }

    #[test]
    fn human_weight_switches_to_kilograms() {
        assert_eq!(human_weight(500), "500g");
        assert_eq!(human_weight(2500), "2.50kg");
    }

    #[test]
    fn volumes_normalise() {
        assert_eq!(normalize_volume("50cl"), "500ml");
        assert_eq!(normalize_volume("0.5 l"), "500ml");
        assert_eq!(normalize_volume("1500ml"), "1.5L");
        assert_eq!(normalize_volume("1 Litre"), "1L");
        assert_eq!(normalize_volume("one bottle"), "one bottle");
    }
}
