//! Output side of the pipeline: Matrixify CSV for Shopify, the Business
//! Central item import, the Excel review workbook, and matching against an
//! existing Shopify product export.

pub mod business_central;
mod csv_out;
pub mod error;
pub mod excel;
pub mod html;
pub mod inventory;
pub mod metafield;
pub mod shopify;

pub use business_central::{write_business_central_csv, BusinessCentralRow};
pub use csv_out::UTF8_BOM;
pub use error::ExportError;
pub use excel::write_excel;
pub use inventory::{
    load_inventory, match_products, DataGaps, GapEntry, Inventory, InventoryItem, InventoryStats,
    MatchKind, MatchSummary,
};
pub use metafield::{format_list_metafield, format_rich_text_metafield};
pub use shopify::{shopify_row, write_shopify_csv, ShopifyRow};
