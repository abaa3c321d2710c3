use std::sync::LazyLock;

use larder_core::Nutrition;
use scraper::{ElementRef, Html, Selector};

use super::{parse_labelled_rows, parse_text};

/// A table is considered only if its text mentions one of these.
const TABLE_HINTS: [&str; 5] = ["energy", "calories", "protein", "fat", "carbohydrate"];

/// A table yielding fewer fields than this is assumed not to be the panel.
const MIN_TABLE_FIELDS: usize = 3;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid selector"));

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_table(table: ElementRef<'_>) -> Nutrition {
    let rows: Vec<Vec<String>> = table
        .select(&ROW_SELECTOR)
        .map(|row| row.select(&CELL_SELECTOR).map(cell_text).collect())
        .filter(|cells: &Vec<String>| cells.len() >= 2)
        .collect();
    parse_labelled_rows(
        rows.iter()
            .map(|cells| (cells[0].as_str(), cells[1].as_str())),
    )
}

pub(super) fn parse_html(html: &str) -> Nutrition {
    let document = Html::parse_document(html);

    for table in document.select(&TABLE_SELECTOR) {
        let text = table.text().collect::<String>().to_lowercase();
        if !TABLE_HINTS.iter().any(|hint| text.contains(hint)) {
            continue;
        }
        let nutrition = parse_table(table);
        if nutrition.len() >= MIN_TABLE_FIELDS {
            return nutrition;
        }
    }

    tracing::debug!("no usable nutrition table; falling back to page text");
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    parse_text(&text)
}
