//! Ingest a supplier sheet, infer facts, and serialize every export format.

use larder_core::{DietaryTag, HeaderlessLayout};
use larder_enrich::facts::apply_facts;
use larder_export::{
    load_inventory, match_products, shopify_row, write_business_central_csv, write_excel,
    write_shopify_csv,
};
use larder_ingest::parse_csv;

const SUPPLIER_CSV: &str = "Code,Description,Organic,Vegan,ingredients
Q123,Organic Quinoa 500g,Yes,No,Quinoa
OB1,Oat Bars 4 x 35g,,,\"Oats, Honey, Sunflower Oil\"
";

const INVENTORY_CSV: &str = "ID,Handle,Title,Variant SKU,Variant Barcode
9001,quinoa-organic,Organic Quinoa,Q123,
";

#[test]
fn supplier_sheet_becomes_shopify_rows() {
    let report = parse_csv(
        SUPPLIER_CSV.as_bytes(),
        "Store Cupboard",
        &HeaderlessLayout::default(),
    )
    .unwrap();
    let mut products = report.products;
    assert_eq!(products.len(), 2);
    for product in &mut products {
        apply_facts(product);
    }

    let quinoa = &products[0];
    assert_eq!(quinoa.name, "Organic Quinoa 500g");
    assert!(quinoa.dietary.contains(&DietaryTag::Organic));
    assert!(!quinoa.dietary.contains(&DietaryTag::Vegan));
    assert!(quinoa.icons.contains(&DietaryTag::Organic));

    let row = shopify_row(quinoa, "Earthfare Supermarket");
    assert_eq!(row.handle, "organic-quinoa-500g");
    let dietary: Vec<String> = serde_json::from_str(&row.dietary_preferences).unwrap();
    assert!(dietary.iter().any(|d| d == "Organic"));
    let ingredients: serde_json::Value = serde_json::from_str(&row.ingredients).unwrap();
    assert_eq!(ingredients["type"], "root");
}

#[test]
fn matched_products_export_as_updates() {
    let report = parse_csv(
        SUPPLIER_CSV.as_bytes(),
        "Store Cupboard",
        &HeaderlessLayout::default(),
    )
    .unwrap();
    let mut products = report.products;
    let inventory = load_inventory(INVENTORY_CSV.as_bytes()).unwrap();

    let summary = match_products(&mut products, &inventory);
    assert_eq!(summary.by_sku, 1);
    assert_eq!(summary.unmatched, 1);

    let csv = write_shopify_csv(&products, "Earthfare Supermarket").unwrap();
    let text = String::from_utf8(csv[3..].to_vec()).unwrap();
    let mut lines = text.lines().skip(1);
    assert!(lines.next().unwrap().starts_with("9001,quinoa-organic,"));
    assert!(lines.next().unwrap().starts_with(",oat-bars-4-x-35g,"));

    let bc = write_business_central_csv(&products).unwrap();
    assert!(String::from_utf8_lossy(&bc).contains("Q123,,Organic Quinoa 500g,0.5,,"));

    let workbook = write_excel(&products).unwrap();
    assert!(workbook.starts_with(b"PK"));
}
