use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::category::{apply_fixups, CategoryRule, RULES};
use super::{Datasets, Record};

static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());

/// One capture pattern per dispatch row: `var NAME = [ ... ];`, lazy, multi-line.
static LITERAL_RES: LazyLock<Vec<(&'static CategoryRule, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let pattern = format!(r"(?s)var {}\s*=\s*(\[.*?\]);", regex::escape(rule.var_name));
            (rule, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Text of every inline script block that has any.
pub fn script_blocks(doc: &Html) -> Vec<String> {
    doc.select(&SCRIPT_SEL)
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Scan script blocks for known variable markers and decode their array literals.
/// A category whose literal is missing or malformed is skipped, never fatal.
pub fn extract(doc: &Html) -> Datasets {
    let mut found: Datasets = BTreeMap::new();

    for (idx, block) in script_blocks(doc).iter().enumerate() {
        for (rule, re) in LITERAL_RES.iter() {
            let category = rule.category;
            if !block.contains(&category.marker()) {
                continue;
            }
            if found.contains_key(&category) {
                debug!("script {}: {} already extracted, ignoring", idx, category.key());
                continue;
            }
            let Some(caps) = re.captures(block) else {
                debug!("script {}: marker for {} present but no array literal", idx, category.key());
                continue;
            };
            if let Some(records) = decode_literal(rule, &caps[1]) {
                debug!("script {}: {} records for {}", idx, records.len(), category.key());
                found.insert(category, records);
            }
        }
    }

    found
}

/// Fix up and decode one captured literal. `None` when it is not an array of objects.
pub fn decode_literal(rule: &CategoryRule, literal: &str) -> Option<Vec<Record>> {
    let fixed = apply_fixups(rule, literal);
    let value: Value = match serde_json::from_str(&fixed) {
        Ok(v) => v,
        Err(e) => {
            warn!("Skipping {}: literal did not decode: {}", rule.category.key(), e);
            return None;
        }
    };

    let Value::Array(items) = value else {
        warn!("Skipping {}: literal is not an array", rule.category.key());
        return None;
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                warn!(
                    "Skipping {}: array element is not an object ({})",
                    rule.category.key(),
                    type_name(&other)
                );
                return None;
            }
        }
    }
    Some(records)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
