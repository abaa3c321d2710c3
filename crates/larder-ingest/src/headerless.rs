//! Row parser for positional (headerless) supplier exports.

use std::collections::BTreeSet;

use larder_core::{DataSource, DietaryTag, HeaderlessLayout, Product};
use tracing::debug;

use crate::barcode::clean_barcode;
use crate::error::IngestError;
use crate::reader::{finish_draft, flag_value};

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map_or("", |c| c.trim())
}

pub(crate) fn parse_headerless_row(
    cells: &[String],
    category: &str,
    layout: &HeaderlessLayout,
) -> Result<Product, IngestError> {
    let name = cell(cells, layout.description);
    if name.is_empty() {
        return Err(IngestError::MissingField {
            candidates: format!("column {}", layout.description),
        });
    }
    let row_category = layout.category.map_or("", |i| cell(cells, i));
    let category = if row_category.is_empty() {
        category
    } else {
        row_category
    };
    let mut product = Product::draft(name, category)?;

    product.sku = cell(cells, layout.code).to_string();
    product.barcode = clean_barcode(cell(cells, layout.barcode));
    product.brand = match cell(cells, layout.brand) {
        "" => cell(cells, layout.brand_short).to_string(),
        brand => brand.to_string(),
    };
    product.image_path = cell(cells, layout.image_path).to_string();

    let mut badges = BTreeSet::new();
    for (offset, column) in layout.flag_columns.iter().enumerate() {
        let Some(tag) = DietaryTag::canonicalize(column) else {
            debug!(column = %column, "flag column is not a dietary tag");
            continue;
        };
        match flag_value(cell(cells, layout.flags_start + offset)) {
            Some(true) => {
                badges.insert(tag);
            }
            Some(false) => {
                product.dietary_denied.insert(tag);
            }
            None => {}
        }
    }
    product.fill_dietary_badges(badges, DataSource::Csv);

    finish_draft(&mut product);
    Ok(product)
}
