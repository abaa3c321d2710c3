//! CSV file ingestion: decode, detect layout, parse rows, report skips.

use larder_core::{HeaderlessLayout, Product};
use larder_facts::detect_certifications;
use tracing::{debug, info, warn};

use crate::decode::decode_text;
use crate::error::IngestError;
use crate::fields::Row;
use crate::headered::parse_headered_row;
use crate::headerless::parse_headerless_row;
use crate::schema::{detect_schema, Schema};
use crate::weight::{human_weight, parse_weight_to_grams};

/// A row that produced no product, with its 1-based file position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Outcome of one file: every accepted product plus every skipped row.
#[derive(Debug)]
pub struct IngestReport {
    pub schema: Schema,
    pub products: Vec<Product>,
    pub skipped: Vec<SkippedRow>,
}

/// Interpret a yes/no flag cell. Anything unrecognised is `None`.
pub(crate) fn flag_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "x" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Derivations shared by both row parsers once the raw fields are set.
pub(crate) fn finish_draft(product: &mut Product) {
    if product.weight_grams.is_none() {
        product.weight_grams = parse_weight_to_grams(&product.name);
    }
    if let Some(grams) = product.weight_grams {
        product
            .specifications
            .entry("weight".to_string())
            .or_insert_with(|| human_weight(grams));
    }
    if !product.ingredients.is_empty() {
        product
            .specifications
            .insert("ingredients".to_string(), product.ingredients.clone());
    }

    for cert in detect_certifications(&product.marker_text()) {
        if !product
            .certifications
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&cert))
        {
            product.certifications.push(cert);
        }
    }
}

/// Parse a whole CSV file into draft products.
///
/// Malformed rows are skipped and reported; only a file that yields no
/// product at all is an error.
///
/// # Errors
///
/// Returns [`IngestError::NoValidRows`] when no row produced a product.
pub fn parse_csv(
    bytes: &[u8],
    category: &str,
    layout: &HeaderlessLayout,
) -> Result<IngestReport, IngestError> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records: Vec<(usize, Vec<String>)> = Vec::new();
    let mut skipped = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        match result {
            Ok(record) => {
                let cells: Vec<String> = record.iter().map(str::to_string).collect();
                if cells.iter().all(String::is_empty) {
                    debug!(row, "skipping blank row");
                    continue;
                }
                records.push((row, cells));
            }
            Err(e) => {
                warn!(row, error = %e, "unreadable CSV record");
                skipped.push(SkippedRow {
                    row,
                    reason: e.to_string(),
                });
            }
        }
    }

    let Some((_, first)) = records.first() else {
        return Err(IngestError::NoValidRows {
            rows: 0,
            headers: String::new(),
        });
    };
    let schema = detect_schema(first.as_slice());
    debug!(?schema, first_row = ?first, "detected CSV layout");

    let (headers, data): (Vec<String>, &[(usize, Vec<String>)]) = match schema {
        Schema::Headered => (first.clone(), &records[1..]),
        Schema::Headerless => (Vec::new(), &records[..]),
    };

    let mut products = Vec::with_capacity(data.len());
    for (row, cells) in data {
        let parsed = match schema {
            Schema::Headered => {
                let pairs = Row::from_pairs(headers.iter().zip(cells.iter()));
                parse_headered_row(&pairs, category)
            }
            Schema::Headerless => parse_headerless_row(cells, category, layout),
        };
        match parsed {
            Ok(product) => products.push(product),
            Err(e) => {
                warn!(row = *row, error = %e, "skipping row");
                skipped.push(SkippedRow {
                    row: *row,
                    reason: e.to_string(),
                });
            }
        }
    }

    if products.is_empty() {
        return Err(IngestError::NoValidRows {
            rows: data.len(),
            headers: if headers.is_empty() {
                "(headerless)".to_string()
            } else {
                headers.join(", ")
            },
        });
    }

    info!(
        products = products.len(),
        skipped = skipped.len(),
        ?schema,
        "parsed CSV"
    );
    Ok(IngestReport {
        schema,
        products,
        skipped,
    })
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
