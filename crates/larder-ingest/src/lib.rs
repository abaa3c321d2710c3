//! Ingestion: decode supplier CSV exports, decide headered vs. positional
//! layout, and turn each row into a draft [`larder_core::Product`] with
//! cleaned barcodes, weights, dietary flags and CSV-sourced nutrition.

pub mod barcode;
pub mod decode;
pub mod error;
pub mod fields;
mod headered;
mod headerless;
pub mod reader;
pub mod schema;
pub mod weight;

pub use barcode::{clean_barcode, is_valid_barcode};
pub use error::IngestError;
pub use fields::{extract, extract_list, extract_required, parse_list_field, Row};
pub use reader::{parse_csv, IngestReport, SkippedRow};
pub use schema::{detect_schema, Schema};
pub use weight::{human_weight, normalize_volume, parse_weight_to_grams};
