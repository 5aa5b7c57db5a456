pub mod category;
pub mod contact;
pub mod normalize;
pub mod scripts;
pub mod table;

use std::collections::BTreeMap;

use scraper::Html;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use category::Category;
use normalize::Table;

/// One embedded record: field name to raw value, in source order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Records per category, iterated in category declaration order.
pub type Datasets = BTreeMap<Category, Vec<Record>>;

/// Script literals first; the companies table is read only when no script
/// supplied a companies dataset. Empty result is `NoDataFound`.
pub fn extract(content: &[u8]) -> Result<Datasets> {
    let html = String::from_utf8_lossy(content);
    let doc = Html::parse_document(&html);

    let mut datasets = scripts::extract(&doc);

    if !datasets.contains_key(&Category::Companies) {
        if let Some(records) = table::extract(&doc) {
            debug!("companies table fallback: {} records", records.len());
            datasets.insert(Category::Companies, records);
        }
    }

    if datasets.is_empty() {
        return Err(PipelineError::NoDataFound);
    }
    Ok(datasets)
}

/// Two-stage pipeline: page bytes → datasets → normalized tables.
pub fn process_page(content: &[u8]) -> Result<Vec<Table>> {
    let datasets = extract(content)?;
    let tables: Vec<Table> = datasets
        .into_iter()
        .filter_map(|(category, records)| {
            let count = records.len();
            let table = normalize::normalize(category, records);
            if table.is_none() {
                info!("{}: found but empty, skipping", category.key());
            } else {
                info!("{}: {} records", category.key(), count);
            }
            table
        })
        .collect();
    Ok(tables)
}
