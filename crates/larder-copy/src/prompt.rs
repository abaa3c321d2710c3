//! System prompt and per-product user message.

use std::collections::BTreeMap;

use larder_core::dietary_tag::dietary_summary;
use larder_core::Product;
use serde_json::{json, Map, Value};

/// Brand-voice instructions and the six-field JSON contract.
pub const SYSTEM_PROMPT: &str = r#"You are a warm, knowledgeable copywriter for Earthfare, an independent natural grocery and wholefoods store in Glastonbury. Write like a friendly, planet-conscious neighbour recommending something they love.

VOICE
- Customers are community members. Use "we" and "you" language.
- Ethical choices are delightful discoveries, never sacrifices. Invite, never preach.
- Share product knowledge without jargon. Mention producer, region or method when known.
- Conversational rhythm with contractions. UK English spelling. Short sentences.
- No emojis, no ALL CAPS, no em dashes, no retail terms (shop, buy, order, price, delivery, shipping).

INPUT
You receive product JSON prefixed by "Product data:". Treat it as the only source of truth. Never invent claims, certifications or origins. Omit anything that is missing.
"content_ratio" gives the lifestyle to technical balance for the body copy.

OUTPUT
Return only valid JSON (no markdown, no comments) with exactly these keys:
{ "title": "...", "body_html": "...", "short_description": "...", "meta_description": "...", "dietary_preferences": ["..."], "brand": "..." }

- title: the product name tidied for a storefront, including size when given.
- body_html: ordered <p> blocks. First a lifestyle paragraph (why you'll love it, who it's for), then a technical paragraph (ingredients, sourcing, certifications), then one <p> per product detail present in the data, e.g. <p>Weight: 500g.</p>, <p>Origin: Italy.</p>, <p>Organic. Vegan.</p>. At most 2000 characters.
- short_description: exactly one <p> with three fragments of 2 to 8 words separated by <br>: sourcing hook, key benefit, versatility or dietary note. At most 150 characters.
- meta_description: one plain-text sentence of 150 to 160 characters that names the product and leads with a benefit.
- dietary_preferences: dietary claims supported by the data only, e.g. "Organic", "Vegan", "Gluten Free". Use [] when none apply.
- brand: the producer or brand name from the data, or "" when unknown."#;

/// Specification keys hoisted to the top level of the payload.
const TOP_LEVEL_SPECS: [&str; 2] = ["usage", "audience"];

/// Specifications allowed for the product's category, plus a dietary
/// summary when the category allows one and the row did not carry it.
fn allowed_specifications(product: &Product) -> BTreeMap<String, String> {
    let allowed = product.policy_category().allowed_specs();
    let mut specs: BTreeMap<String, String> = product
        .specifications
        .iter()
        .filter(|(key, value)| allowed.contains(&key.as_str()) && !value.trim().is_empty())
        .map(|(key, value)| (key.clone(), value.trim().to_owned()))
        .collect();

    if allowed.contains(&"dietary") && !product.dietary.is_empty() {
        specs
            .entry("dietary".to_owned())
            .or_insert_with(|| dietary_summary(&product.dietary));
    }
    if allowed.contains(&"certifications") && !product.certifications.is_empty() {
        specs
            .entry("certifications".to_owned())
            .or_insert_with(|| product.certifications.join(", "));
    }
    specs
}

fn insert_text(data: &mut Map<String, Value>, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        data.insert(key.to_owned(), Value::from(value));
    }
}

fn insert_list(data: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        data.insert(key.to_owned(), json!(values));
    }
}

/// The user message for one product: `Product data:` followed by the
/// product facts as pretty JSON.
#[must_use]
pub fn build_prompt(product: &Product) -> String {
    let policy = product.policy_category();
    let (lifestyle, technical) = policy.content_ratio();

    let mut data = Map::new();
    insert_text(&mut data, "name", &product.name);
    insert_text(&mut data, "category", &product.category);
    insert_text(&mut data, "sku", &product.sku);
    insert_text(&mut data, "brand", &product.brand);
    for key in TOP_LEVEL_SPECS {
        if let Some(value) = product.specifications.get(key) {
            insert_text(&mut data, key, value);
        }
    }
    insert_list(&mut data, "features", &product.features);
    insert_list(&mut data, "benefits", &product.benefits);

    let specs = allowed_specifications(product);
    tracing::debug!(
        product = %product.name,
        category = %policy,
        kept = specs.len(),
        total = product.specifications.len(),
        "filtered specifications"
    );
    if !specs.is_empty() {
        data.insert("specifications".to_owned(), json!(specs));
    }
    data.insert(
        "content_ratio".to_owned(),
        Value::from(format!("Lifestyle {lifestyle} : Technical {technical}")),
    );

    format!("Product data:\n{:#}", Value::Object(data))
}
