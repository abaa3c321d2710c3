//! Shopify product import rows in Matrixify's column layout.

use larder_core::category::needs_supplement_disclaimer;
use larder_core::{slugify, Product};
use larder_facts::metafield_lines;
use larder_ingest::clean_barcode;
use serde::Serialize;

use crate::csv_out::write_csv;
use crate::error::ExportError;
use crate::html::format_long_description_html;
use crate::metafield::{format_list_metafield, format_rich_text_metafield};

pub const SUPPLEMENT_DISCLAIMER: &str = "Important: If you are taking any medication, are pregnant or breastfeeding, or have an underlying health condition, please consult your doctor or a qualified healthcare professional before taking this supplement. Always read the leaflet/product before use and for the most up-to-date ingredients lists and directions for use.";

/// Matrixify column names, including the metafield type annotations.
pub const SHOPIFY_HEADERS: [&str; 14] = [
    "ID",
    "Handle",
    "Title",
    "Body HTML",
    "Vendor",
    "Type",
    "Variant Barcode",
    "Metafield: custom.allergens [list.single_line_text_field]",
    "Metafield: pdp.ingredients [rich_text_field]",
    "Metafield: pdp.nutrition [list.single_line_text_field]",
    "Metafield: custom.dietary_preferences [list.single_line_text_field]",
    "Metafield: custom.icons [list.single_line_text_field]",
    "Metafield: custom.brand [single_line_text_field]",
    "Metafield: custom.supplement_disclaimer [multi_line_text_field]",
];

/// One Matrixify row. Field order follows [`SHOPIFY_HEADERS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShopifyRow {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub barcode: String,
    pub allergens: String,
    pub ingredients: String,
    pub nutrition: String,
    pub dietary_preferences: String,
    pub icons: String,
    pub brand: String,
    pub supplement_disclaimer: String,
}

/// Inferred dietary tags, or the generated list when inference found none.
fn dietary_entries(product: &Product) -> Vec<String> {
    if !product.dietary.is_empty() {
        return product.dietary.iter().map(|t| t.as_str().to_owned()).collect();
    }
    product
        .descriptions
        .as_ref()
        .map(|d| d.dietary_preferences.clone())
        .unwrap_or_default()
}

fn non_empty_or<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.trim().is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Serialize one product. A handle assigned by the inventory matcher is
/// reused so the import updates the existing listing.
#[must_use]
pub fn shopify_row(product: &Product, vendor: &str) -> ShopifyRow {
    let descriptions = product.descriptions.clone().unwrap_or_default();
    let title = non_empty_or(&descriptions.title, &product.name).trim().to_owned();
    let handle = if product.shopify_handle.is_empty() {
        slugify(&title)
    } else {
        product.shopify_handle.clone()
    };

    let nutrition = if product.nutrition_lines.is_empty() {
        metafield_lines(&product.nutrition)
    } else {
        product.nutrition_lines.clone()
    };
    let allergens: Vec<&str> = product.allergens.iter().map(String::as_str).collect();
    let icons: Vec<&str> = product.icons.iter().map(|t| t.as_str()).collect();

    ShopifyRow {
        id: product.shopify_id.clone(),
        handle,
        title,
        body_html: format_long_description_html(&descriptions.body_html),
        vendor: vendor.to_owned(),
        product_type: product.category.clone(),
        barcode: clean_barcode(&product.barcode),
        allergens: format_list_metafield(&allergens),
        ingredients: format_rich_text_metafield(&product.ingredients),
        nutrition: format_list_metafield(&nutrition),
        dietary_preferences: format_list_metafield(&dietary_entries(product)),
        icons: format_list_metafield(&icons),
        brand: non_empty_or(&descriptions.brand, &product.brand).trim().to_owned(),
        supplement_disclaimer: if needs_supplement_disclaimer(&product.category) {
            SUPPLEMENT_DISCLAIMER.to_owned()
        } else {
            String::new()
        },
    }
}

/// Write a Matrixify CSV with a UTF-8 byte-order mark.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a row cannot be written.
pub fn write_shopify_csv(products: &[Product], vendor: &str) -> Result<Vec<u8>, ExportError> {
    let rows: Vec<ShopifyRow> = products.iter().map(|p| shopify_row(p, vendor)).collect();
    let updates = rows.iter().filter(|r| !r.id.is_empty()).count();
    let bytes = write_csv(&SHOPIFY_HEADERS, &rows)?;
    tracing::info!(
        products = rows.len(),
        updates,
        creates = rows.len() - updates,
        "exported Shopify CSV"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use larder_core::{DataSource, Descriptions, DietaryTag, Nutrition};

    use super::*;

    fn product() -> Product {
        let mut p = Product::draft("Mum's Oat & Honey Bars", "Snacks & Treats").unwrap();
        p.barcode = "5.01234567890E+12".into();
        p.brand = "Acme".into();
        p.fill_ingredients("Oats\nHoney", DataSource::Csv);
        p.allergens.insert("Cereals Containing Gluten".into());
        p.dietary.insert(DietaryTag::Vegetarian);
        let mut n = Nutrition::new();
        n.insert("fat", "12.5");
        p.fill_nutrition(n, DataSource::Csv);
        p
    }

    #[test]
    fn new_product_gets_slug_handle_and_clean_barcode() {
        let row = shopify_row(&product(), "Earthfare Supermarket");
        assert_eq!(row.id, "");
        assert_eq!(row.handle, "mums-oat-and-honey-bars");
        assert_eq!(row.barcode, "5012345678900");
        assert_eq!(row.vendor, "Earthfare Supermarket");
        assert_eq!(row.product_type, "Snacks & Treats");
        assert_eq!(row.brand, "Acme");
        assert_eq!(row.dietary_preferences, r#"["Vegetarian"]"#);
        assert_eq!(row.nutrition, r#"["Fat: 12.5g"]"#);
        assert_eq!(row.icons, "");
        assert_eq!(row.supplement_disclaimer, "");
        assert!(row.ingredients.contains(r#""value":"Honey""#));
    }

    #[test]
    fn matched_product_keeps_existing_identity() {
        let mut p = product();
        p.shopify_id = "8123456789".into();
        p.shopify_handle = "oat-honey-bar-legacy".into();
        let row = shopify_row(&p, "Earthfare Supermarket");
        assert_eq!(row.id, "8123456789");
        assert_eq!(row.handle, "oat-honey-bar-legacy");
    }

    #[test]
    fn generated_copy_supplies_title_body_and_fallback_dietary() {
        let mut p = product();
        p.dietary.clear();
        p.descriptions = Some(Descriptions {
            title: "Oat & Honey Bars 4 x 35g".into(),
            body_html: "Chewy and golden.\n\nBaked in Somerset.".into(),
            dietary_preferences: vec!["Vegetarian".into()],
            ..Descriptions::default()
        });
        let row = shopify_row(&p, "Store");
        assert_eq!(row.title, "Oat & Honey Bars 4 x 35g");
        assert_eq!(row.handle, "oat-and-honey-bars-4-x-35g");
        assert_eq!(row.body_html, "<p>Chewy and golden.</p><p>Baked in Somerset.</p>");
        assert_eq!(row.dietary_preferences, r#"["Vegetarian"]"#);
        assert_eq!(row.brand, "Acme");
    }

    #[test]
    fn health_products_carry_disclaimer() {
        let mut p = product();
        p.category = "Supplements & Vitamins".into();
        assert_eq!(shopify_row(&p, "Store").supplement_disclaimer, SUPPLEMENT_DISCLAIMER);
    }

    #[test]
    fn csv_output_has_bom_and_matrixify_headers() {
        let bytes = write_shopify_csv(&[product()], "Store").unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("ID,Handle,Title,Body HTML,Vendor,Type,Variant Barcode,"));
        assert!(header.ends_with("Metafield: custom.supplement_disclaimer [multi_line_text_field]"));
        assert_eq!(header.split(',').count(), 14);
    }

    #[test]
    fn empty_export_still_has_headers() {
        let bytes = write_shopify_csv(&[], "Store").unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("ID,Handle,"));
    }
}
