//! Flat item import for Business Central.

use larder_core::Product;
use larder_ingest::clean_barcode;
use serde::Serialize;

use crate::csv_out::write_csv;
use crate::error::ExportError;
use crate::html::{clean_text, format_long_description_html, format_short_description_html};

pub const BUSINESS_CENTRAL_HEADERS: [&str; 6] = [
    "SKU",
    "Barcode",
    "Description",
    "Net Weight (KG)",
    "Short Description",
    "Long Description",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusinessCentralRow {
    pub sku: String,
    pub barcode: String,
    pub description: String,
    pub net_weight_kg: String,
    pub short_description: String,
    pub long_description: String,
}

/// Grams as a kilogram figure without trailing zeros: 500 -> `0.5`.
#[must_use]
pub fn kilograms(grams: u32) -> String {
    let kg = format!("{:.3}", f64::from(grams) / 1000.0);
    kg.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[must_use]
pub fn business_central_row(product: &Product) -> BusinessCentralRow {
    let descriptions = product.descriptions.clone().unwrap_or_default();
    BusinessCentralRow {
        sku: product.sku.clone(),
        barcode: clean_barcode(&product.barcode),
        description: clean_text(&product.name),
        net_weight_kg: product.weight_grams.map(kilograms).unwrap_or_default(),
        short_description: format_short_description_html(&clean_text(
            &descriptions.short_description,
        )),
        long_description: format_long_description_html(&clean_text(&descriptions.body_html)),
    }
}

/// Write the Business Central CSV with a UTF-8 byte-order mark.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a row cannot be written.
pub fn write_business_central_csv(products: &[Product]) -> Result<Vec<u8>, ExportError> {
    let rows: Vec<BusinessCentralRow> = products.iter().map(business_central_row).collect();
    let bytes = write_csv(&BUSINESS_CENTRAL_HEADERS, &rows)?;
    tracing::info!(products = rows.len(), "exported Business Central CSV");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use larder_core::Descriptions;

    use super::*;

    #[test]
    fn weight_is_reported_in_kilograms() {
        assert_eq!(kilograms(500), "0.5");
        assert_eq!(kilograms(2500), "2.5");
        assert_eq!(kilograms(1000), "1");
        assert_eq!(kilograms(35), "0.035");
    }

    #[test]
    fn plain_copy_is_wrapped_in_paragraphs() {
        let mut p = Product::draft("Sourdough Loaf 800g", "Bakery").unwrap();
        p.sku = "SD800".into();
        p.barcode = "761234567890".into();
        p.weight_grams = Some(800);
        p.descriptions = Some(Descriptions {
            short_description: "Slow proved<!--image-->\nBaked in Street".into(),
            body_html: "A crackling crust.\n\nMade with three ingredients.".into(),
            ..Descriptions::default()
        });

        let row = business_central_row(&p);
        assert_eq!(row.barcode, "0761234567890");
        assert_eq!(row.net_weight_kg, "0.8");
        assert_eq!(row.short_description, "<p>Slow proved<br>Baked in Street</p>");
        assert_eq!(
            row.long_description,
            "<p>A crackling crust.</p><p>Made with three ingredients.</p>"
        );
    }

    #[test]
    fn csv_starts_with_bom_and_six_columns() {
        let p = Product::draft("Rice Cakes", "Groceries").unwrap();
        let bytes = write_business_central_csv(&[p]).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("SKU,Barcode,Description,Net Weight (KG),Short Description,Long Description")
        );
        assert_eq!(lines.next(), Some(",,Rice Cakes,,,"));
    }
}
