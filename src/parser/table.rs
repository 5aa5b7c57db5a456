use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::Record;

pub const COMPANIES_TABLE_ID: &str = "companiesTable";

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!("table#{}", COMPANIES_TABLE_ID)).unwrap());
static THEAD_ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("thead tr").unwrap());
static TBODY_ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Read the companies table into one record per body row, keyed by header text.
/// `None` when the table or its header row is missing.
pub fn extract(doc: &Html) -> Option<Vec<Record>> {
    let table = doc.select(&TABLE_SEL).next()?;

    let header_row = table
        .select(&THEAD_ROW_SEL)
        .next()
        .or_else(|| table.select(&ROW_SEL).find(|r| r.select(&TH_SEL).next().is_some()))?;
    let headers: Vec<String> = header_row.select(&TH_SEL).map(cell_text).collect();
    if headers.is_empty() {
        debug!("#{} has no header cells", COMPANIES_TABLE_ID);
        return None;
    }

    let body_rows: Vec<ElementRef> = {
        let in_tbody: Vec<ElementRef> = table.select(&TBODY_ROW_SEL).collect();
        if in_tbody.is_empty() {
            table.select(&ROW_SEL).filter(|r| r.id() != header_row.id()).collect()
        } else {
            in_tbody
        }
    };

    let records: Vec<Record> = body_rows
        .into_iter()
        .map(|row| row.select(&TD_SEL).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .map(|cells| zip_row(&headers, cells))
        .collect();

    debug!("#{}: {} columns, {} rows", COMPANIES_TABLE_ID, headers.len(), records.len());
    Some(records)
}

/// Text nodes trimmed and joined with single spaces.
fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Positional mapping; short rows pad with "", surplus cells are dropped.
fn zip_row(headers: &[String], cells: Vec<String>) -> Record {
    let mut cells = cells.into_iter();
    headers
        .iter()
        .map(|h| (h.clone(), Value::String(cells.next().unwrap_or_default())))
        .collect()
}
