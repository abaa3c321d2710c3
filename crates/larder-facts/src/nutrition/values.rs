use std::sync::LazyLock;

use regex::Regex;

static TRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:trace|tr)\b").expect("valid regex"));

static LESS_THAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:<|less than)\s*(\d+(?:[.,]\d+)?)").expect("valid regex")
});

/// Thousands-grouped numbers (`1,046`) are tried before decimal-comma ones
/// (`0,5`).
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:[.,]\d+)?)").expect("valid regex")
});

fn normalize_number(raw: &str) -> String {
    let grouped = raw.len() > 4
        && raw
            .split(',')
            .skip(1)
            .all(|group| group.len() >= 3 && group.as_bytes()[..3].iter().all(u8::is_ascii_digit));
    if raw.contains(',') && grouped {
        raw.replace(',', "")
    } else {
        raw.replace(',', ".")
    }
}

/// Reduce a raw nutrient cell to its numeric string.
///
/// `"trace"` becomes `"<0.1"`, `"less than 0.5g"` becomes `"<0.5"`, and
/// otherwise the first number is kept with any unit dropped. Returns `None`
/// when the cell holds no number.
#[must_use]
pub fn clean_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if TRACE_RE.is_match(raw) {
        return Some("<0.1".to_string());
    }
    if let Some(c) = LESS_THAN_RE.captures(raw) {
        return Some(format!("<{}", c[1].replace(',', ".")));
    }
    NUMBER_RE
        .captures(raw)
        .map(|c| normalize_number(&c[1]))
}

/// Render an amount compactly: whole numbers without decimals, amounts of
/// at least 0.1 to one decimal place, and smaller ones to four places with
/// trailing zeros trimmed.
#[must_use]
pub fn format_amount(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        return format!("{value:.0}");
    }
    if value >= 0.1 {
        let rounded = format!("{value:.1}");
        return rounded
            .strip_suffix(".0")
            .map_or_else(|| rounded.clone(), str::to_string);
    }
    let small = format!("{value:.4}");
    small.trim_end_matches('0').trim_end_matches('.').to_string()
}
