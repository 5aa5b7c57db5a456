use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::category::{Category, CategoryRule};
use super::contact::{decompose, Contact};
use super::Record;

/// Composite contact field, after field names are uppercased.
pub const CONTACT_FIELD: &str = "CONTCOMM";

/// A named grid: `rows[i][j]` belongs to `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[cfg(test)]
impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Shape one category's records into a table. `None` for an empty dataset.
pub fn normalize(category: Category, records: Vec<Record>) -> Option<Table> {
    if records.is_empty() {
        return None;
    }
    let rule = category.rule();

    let records: Vec<Record> = records.into_iter().map(|r| reshape(rule, r)).collect();
    let mut columns = union_columns(&records);

    let split_contact = rule.decompose_contact && columns.iter().any(|c| c == CONTACT_FIELD);
    if split_contact {
        columns.retain(|c| c != CONTACT_FIELD);
    }

    let rows: Vec<Vec<Value>> = records
        .into_iter()
        .map(|mut record| {
            let mut row: Vec<Value> = columns
                .iter()
                .map(|c| record.remove(c).unwrap_or(Value::Null))
                .collect();
            if split_contact {
                row.extend(decompose(record.get(CONTACT_FIELD)).into_values());
            }
            row
        })
        .collect();

    if split_contact {
        columns.extend(Contact::COLUMNS.iter().map(|c| c.to_string()));
    }

    Some(Table {
        name: category.sheet_name().to_string(),
        columns,
        rows,
    })
}

/// Renames, drops, then (for contact-bearing categories) uppercases field names.
/// Names that collide after uppercasing keep the last value.
fn reshape(rule: &CategoryRule, record: Record) -> Record {
    let mut out = Record::new();
    for (k, v) in record {
        if rule.drops.contains(&k.as_str()) {
            continue;
        }
        let renamed = rule
            .renames
            .iter()
            .find(|(from, _)| *from == k)
            .map(|(_, to)| to.to_string())
            .unwrap_or_else(|| k.clone());
        let key = if rule.decompose_contact {
            renamed.to_uppercase()
        } else {
            renamed
        };
        if let Some(prev) = out.insert(key.clone(), v) {
            debug!(
                "{}: field {:?} collides with another as {:?}, dropping {}",
                rule.category.key(),
                k,
                key,
                prev
            );
        }
    }
    out
}

/// Field names across all records, in first-seen order.
fn union_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}
