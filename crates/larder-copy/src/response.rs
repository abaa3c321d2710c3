//! Completion parsing and validation.

use larder_core::Descriptions;
use serde::Deserialize;

use crate::error::CopyError;

/// Longest meta description accepted by the storefront.
pub const META_MAX_CHARS: usize = 160;

#[derive(Debug, Deserialize)]
struct GeneratedCopy {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body_html: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    meta_description: String,
    dietary_preferences: Option<Vec<String>>,
    brand: Option<String>,
}

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence.
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Clamp to [`META_MAX_CHARS`], cutting at the last full stop inside the
/// limit when there is one, else truncating with an ellipsis.
#[must_use]
pub fn clamp_meta(meta: &str) -> String {
    let meta = meta.trim();
    if meta.chars().count() <= META_MAX_CHARS {
        return meta.to_owned();
    }
    let head: String = meta.chars().take(META_MAX_CHARS).collect();
    if let Some(period) = head.rfind('.') {
        return head[..=period].to_owned();
    }
    let mut cut: String = meta.chars().take(META_MAX_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

fn require(value: &str, field: &'static str) -> Result<(), CopyError> {
    if value.trim().is_empty() {
        return Err(CopyError::MissingField { field });
    }
    Ok(())
}

/// Parse a completion into [`Descriptions`].
///
/// The four text fields must be non-empty. `dietary_preferences` and
/// `brand` must be present but may be empty.
///
/// # Errors
///
/// - [`CopyError::InvalidJson`] when the content is not a JSON object.
/// - [`CopyError::MissingField`] when a required key is absent or blank.
pub fn parse_response(content: &str) -> Result<Descriptions, CopyError> {
    let copy: GeneratedCopy =
        serde_json::from_str(strip_code_fences(content)).map_err(CopyError::InvalidJson)?;

    require(&copy.title, "title")?;
    require(&copy.body_html, "body_html")?;
    require(&copy.short_description, "short_description")?;
    require(&copy.meta_description, "meta_description")?;
    let dietary_preferences = copy.dietary_preferences.ok_or(CopyError::MissingField {
        field: "dietary_preferences",
    })?;
    let brand = copy
        .brand
        .ok_or(CopyError::MissingField { field: "brand" })?;

    Ok(Descriptions {
        title: copy.title.trim().to_owned(),
        body_html: copy.body_html.trim().to_owned(),
        short_description: copy.short_description.trim().to_owned(),
        meta_description: clamp_meta(&copy.meta_description),
        dietary_preferences: dietary_preferences
            .into_iter()
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .collect(),
        brand: brand.trim().to_owned(),
    })
}
