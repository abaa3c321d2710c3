//! Styled review workbook.

use larder_core::Product;
use larder_facts::metafield_lines;
use larder_ingest::clean_barcode;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::business_central::kilograms;
use crate::error::ExportError;
use crate::html::{clean_text, strip_html};

const SHEET_NAME: &str = "Products";
const HEADER_GREEN: u32 = 0x002E_7D32;
const HEADER_HEIGHT: f64 = 25.0;
const ROW_HEIGHT: f64 = 60.0;

/// Column titles with their widths in characters.
pub const EXCEL_COLUMNS: [(&str, f64); 16] = [
    ("SKU", 15.0),
    ("Barcode", 18.0),
    ("Product Name", 40.0),
    ("Brand", 15.0),
    ("Category", 20.0),
    ("Weight (KG)", 12.0),
    ("Short Description", 50.0),
    ("Long Description", 70.0),
    ("Meta Description", 50.0),
    ("Dietary Preferences", 30.0),
    ("Icons", 35.0),
    ("Ingredients", 60.0),
    ("Allergens", 30.0),
    ("Nutrition (per 100g)", 40.0),
    ("Nutrition Source", 18.0),
    ("Features", 40.0),
];

/// Cell values for one product, in [`EXCEL_COLUMNS`] order.
#[must_use]
pub fn excel_cells(product: &Product) -> [String; 16] {
    let descriptions = product.descriptions.clone().unwrap_or_default();
    let dietary: Vec<&str> = if product.dietary.is_empty() {
        descriptions
            .dietary_preferences
            .iter()
            .map(String::as_str)
            .collect()
    } else {
        product.dietary.iter().map(|t| t.as_str()).collect()
    };
    let icons: Vec<&str> = product.icons.iter().map(|t| t.as_str()).collect();
    let allergens: Vec<&str> = product.allergens.iter().map(String::as_str).collect();
    let nutrition = if product.nutrition_lines.is_empty() {
        metafield_lines(&product.nutrition)
    } else {
        product.nutrition_lines.clone()
    };

    [
        product.sku.clone(),
        clean_barcode(&product.barcode),
        clean_text(&product.name),
        product.brand.clone(),
        product.category.clone(),
        product.weight_grams.map(kilograms).unwrap_or_default(),
        strip_html(&clean_text(&descriptions.short_description)),
        strip_html(&clean_text(&descriptions.body_html)),
        strip_html(&descriptions.meta_description),
        dietary.join(", "),
        icons.join(", "),
        product.ingredients.clone(),
        allergens.join(", "),
        nutrition.join("\n"),
        product
            .nutrition_source()
            .map(ToString::to_string)
            .unwrap_or_default(),
        product.features.join("\n"),
    ]
}

/// Build the review workbook: bold white-on-green header, fixed widths,
/// wrapped top-aligned cells with thin borders, frozen header row.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] if the workbook cannot be written.
pub fn write_excel(products: &[Product]) -> Result<Vec<u8>, ExportError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_GREEN))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new()
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in (0u16..).zip(EXCEL_COLUMNS.iter()) {
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *title, &header_format)?;
    }
    worksheet.set_row_height(0, HEADER_HEIGHT)?;

    for (row, product) in (1u32..).zip(products) {
        for (col, value) in (0u16..).zip(excel_cells(product).iter()) {
            worksheet.write_string_with_format(row, col, value, &cell_format)?;
        }
        worksheet.set_row_height(row, ROW_HEIGHT)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let bytes = workbook.save_to_buffer()?;
    tracing::info!(products = products.len(), "exported Excel workbook");
    Ok(bytes)
}
