//! Row parser for CSVs with a header row.

use std::collections::BTreeSet;

use larder_core::{DataSource, DietaryTag, Product};
use larder_facts::{
    badges_from_text, extract_allergens, parse_nutrition, NutritionInput,
};

use crate::barcode::clean_barcode;
use crate::error::IngestError;
use crate::fields::{extract, extract_list, extract_required, parse_list_field, Row};
use crate::reader::{finish_draft, flag_value};
use crate::weight::{kilograms_to_grams, normalize_volume, parse_grams, parse_weight_to_grams};

const NAME: &[&str] = &[
    "Description",
    "Product Name",
    "Product Title",
    "name",
    "product_name",
    "productName",
    "title",
    "Short Description",
];
const SKU: &[&str] = &["Code", "SKU", "product_code", "item_code"];
const BARCODE: &[&str] = &["barcode", "ean", "upc", "gtin"];
const BRAND: &[&str] = &["brand", "manufacturer"];
const CATEGORY: &[&str] = &["category"];
const LONG_DESCRIPTION: &[&str] = &[
    "Long Description",
    "long_description",
    "product_description",
    "details",
];
const INGREDIENTS: &[&str] = &["ingredients", "contents", "composition"];
const ALLERGENS: &[&str] = &["allergens", "allergy_info"];
const FEATURES: &[&str] = &["features", "key_features", "highlights"];
const BENEFITS: &[&str] = &["benefits", "advantages"];
const CERTIFICATIONS: &[&str] = &["certifications", "certificates", "accreditations"];
const DIETARY: &[&str] = &["dietary", "dietary_info", "diet"];
const IMAGE: &[&str] = &["image", "image_path", "image_url", "image_src"];
const WEIGHT_GRAMS: &[&str] = &["weight_grams", "weightGrams", "grams"];
const WEIGHT_KG: &[&str] = &["weight_kg", "weightKg", "weight_kilograms"];
const WEIGHT_TEXT: &[&str] = &["weight", "weight_text", "net_weight"];
const VOLUME: &[&str] = &["volume", "capacity"];

/// Free-form specification keys and the columns they are read from.
const SPEC_FIELDS: [(&str, &[&str]); 8] = [
    ("origin", &["origin", "made_in", "country", "country_of_origin"]),
    ("producer", &["producer", "supplier", "farm", "grower", "maker"]),
    ("region", &["region", "location", "source_region"]),
    ("storage", &["storage", "storage_instructions"]),
    ("servings", &["servings", "portions", "serves", "serving_size"]),
    ("dosage", &["dosage", "dose", "recommended_dose"]),
    ("usage", &["usage", "use", "serving_suggestion", "directions"]),
    ("audience", &["audience", "suitable_for"]),
];

/// Explicit yes/no dietary flag columns (`Organic`, `is_vegan`, `Gluten-Free`).
fn dietary_flags(row: &Row) -> (BTreeSet<DietaryTag>, BTreeSet<DietaryTag>) {
    let mut badges = BTreeSet::new();
    let mut denied = BTreeSet::new();
    for (key, value) in row.iter() {
        let Some(tag) = DietaryTag::canonicalize(key) else {
            continue;
        };
        match flag_value(value) {
            Some(true) => {
                badges.insert(tag);
            }
            Some(false) => {
                denied.insert(tag);
            }
            None => {}
        }
    }
    (badges, denied)
}

/// A free `dietary` column such as `"Vegan, gluten-free"`.
fn dietary_column(value: &str) -> BTreeSet<DietaryTag> {
    let entries: Vec<&str> = value
        .split([',', ';', '|'])
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();
    badges_from_text(&entries)
}

fn weight_grams(row: &Row) -> Option<u32> {
    let grams = extract(row, WEIGHT_GRAMS);
    if !grams.is_empty() {
        return parse_grams(&grams);
    }
    let kg = extract(row, WEIGHT_KG);
    if !kg.is_empty() {
        return kilograms_to_grams(&kg);
    }
    let text = extract(row, WEIGHT_TEXT);
    if text.is_empty() {
        None
    } else {
        parse_weight_to_grams(&text)
    }
}

/// Nutrition columns, excluding dietary flag columns such as `Sugar Free`.
fn nutrition_columns(row: &Row) -> Vec<(String, String)> {
    row.pairs()
        .iter()
        .filter(|(key, _)| DietaryTag::canonicalize(key).is_none())
        .cloned()
        .collect()
}

pub(crate) fn parse_headered_row(row: &Row, category: &str) -> Result<Product, IngestError> {
    let name = extract_required(row, NAME)?;
    let row_category = extract(row, CATEGORY);
    let category = if row_category.is_empty() {
        category
    } else {
        row_category.as_str()
    };
    let mut product = Product::draft(&name, category)?;

    product.sku = extract(row, SKU);
    product.barcode = clean_barcode(&extract(row, BARCODE));
    product.brand = extract(row, BRAND);
    product.image_path = extract(row, IMAGE);
    product.features = extract_list(row, FEATURES);
    product.benefits = extract_list(row, BENEFITS);
    product.certifications = extract_list(row, CERTIFICATIONS);
    product.weight_grams = weight_grams(row);

    product.fill_description(&extract(row, LONG_DESCRIPTION), DataSource::Csv);
    product.fill_ingredients(&extract(row, INGREDIENTS), DataSource::Csv);

    let allergen_text = extract(row, ALLERGENS);
    let mut allergens = extract_allergens(&allergen_text);
    if allergens.is_empty() {
        allergens.extend(parse_list_field(&allergen_text));
    }
    product.fill_allergens(allergens, DataSource::Csv);

    let (mut badges, denied) = dietary_flags(row);
    badges.extend(dietary_column(&extract(row, DIETARY)));
    product.fill_dietary_badges(badges, DataSource::Csv);
    product.dietary_denied = denied;

    let columns = nutrition_columns(row);
    let nutrition = parse_nutrition(NutritionInput::Columns(&columns));
    product.fill_nutrition(nutrition, DataSource::Csv);

    for (key, candidates) in SPEC_FIELDS {
        let value = extract(row, candidates);
        if !value.is_empty() {
            product.specifications.insert(key.to_string(), value);
        }
    }
    let volume = extract(row, VOLUME);
    if !volume.is_empty() {
        product
            .specifications
            .insert("volume".to_string(), normalize_volume(&volume));
    }
    let weight_text = extract(row, WEIGHT_TEXT);
    if !weight_text.is_empty() {
        product
            .specifications
            .insert("weight".to_string(), weight_text);
    }

    finish_draft(&mut product);
    Ok(product)
}
