use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::{Number, Value};

use crate::error::{PipelineError, Result};
use crate::parser::normalize::Table;

pub const FILE_NAME: &str = "aviation_data.xlsx";
pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest string a single xlsx cell accepts.
const MAX_CELL_CHARS: usize = 32_767;

/// Largest integer magnitude an f64 cell holds exactly.
const MAX_EXACT_INT: u64 = 1 << 53;

/// Build an in-memory workbook, one sheet per table in order: header row, then
/// data rows, no index column. With no tables the writer emits a single blank
/// default sheet.
pub fn serialize(tables: &[Table]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for table in tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&table.name)?;

        for (col, name) in table.columns.iter().enumerate() {
            let (row, col) = cell_pos(&table.name, 0, col)?;
            sheet.write_string_with_format(row, col, name, &header)?;
        }
        for (i, values) in table.rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                let (row, col) = cell_pos(&table.name, i + 1, col)?;
                write_value(sheet, row, col, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Narrow indices to the writer's row/column types without wrapping.
fn cell_pos(sheet: &str, row: usize, col: usize) -> Result<(u32, u16)> {
    match (u32::try_from(row), u16::try_from(col)) {
        (Ok(row), Ok(col)) => Ok((row, col)),
        _ => Err(PipelineError::SheetTooLarge {
            sheet: sheet.to_string(),
        }),
    }
}

fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> std::result::Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match exact_f64(n) {
            Some(f) => {
                sheet.write_number(row, col, f)?;
            }
            None => {
                sheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            sheet.write_string(row, col, clip(s))?;
        }
        other => {
            sheet.write_string(row, col, clip(&other.to_string()))?;
        }
    }
    Ok(())
}

/// `None` for integers an f64 would round; those are written as text.
fn exact_f64(n: &Number) -> Option<f64> {
    if let Some(i) = n.as_i64() {
        return (i.unsigned_abs() <= MAX_EXACT_INT).then_some(i as f64);
    }
    if let Some(u) = n.as_u64() {
        return (u <= MAX_EXACT_INT).then_some(u as f64);
    }
    n.as_f64()
}

fn clip(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_CHARS {
        s.to_string()
    } else {
        s.chars().take(MAX_CELL_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use serde_json::json;

    use super::*;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn round_trip_sheets_headers_and_rows() {
        let tables = vec![
            table(
                "Aircrafts",
                &["TYPE", "H/C", "Name"],
                vec![
                    vec![json!("A320"), json!(2), json!("Sky Jets")],
                    vec![json!("B737"), Value::Null, json!("Gulf Aero")],
                ],
            ),
            table("Engines", &["MODEL"], vec![vec![json!("CFM56")]]),
            table("Companies", &["Name", "Price"], vec![vec![json!("Acme"), json!("100")]]),
        ];

        let mut wb = open(serialize(&tables).unwrap());
        assert_eq!(wb.sheet_names(), vec!["Aircrafts", "Engines", "Companies"]);

        for t in &tables {
            let range = wb.worksheet_range(&t.name).unwrap();
            let mut rows = range.rows();
            let header: Vec<String> = rows.next().unwrap().iter().map(|c| c.to_string()).collect();
            assert_eq!(header, t.columns);
            assert_eq!(rows.count(), t.rows.len(), "row count for {}", t.name);
        }
    }

    #[test]
    fn cell_types_survive() {
        let tables = vec![table(
            "Listings",
            &["ID", "SOLD", "TAGS", "NOTE"],
            vec![vec![json!(77), json!(true), json!(["a", "b"]), Value::Null]],
        )];
        let mut wb = open(serialize(&tables).unwrap());
        let range = wb.worksheet_range("Listings").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(77.0)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Bool(true)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String(r#"["a","b"]"#.to_string())));
    }

    #[test]
    fn large_ids_written_as_text() {
        let tables = vec![table(
            "Listings",
            &["ID", "SMALL", "NEG", "PRICE"],
            vec![vec![
                json!(9_007_199_254_740_993u64),
                json!(9_007_199_254_740_992u64),
                json!(-9_007_199_254_740_993i64),
                json!(1250.5),
            ]],
        )];
        let mut wb = open(serialize(&tables).unwrap());
        let range = wb.worksheet_range("Listings").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("9007199254740993".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(9_007_199_254_740_992.0)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("-9007199254740993".to_string())));
        assert_eq!(range.get_value((1, 3)), Some(&Data::Float(1250.5)));
    }

    #[test]
    fn out_of_range_positions_rejected() {
        assert_eq!(cell_pos("Engines", 3, 7).unwrap(), (3, 7));
        assert!(matches!(
            cell_pos("Engines", 1, u16::MAX as usize + 1),
            Err(PipelineError::SheetTooLarge { .. })
        ));
        assert!(matches!(
            cell_pos("Engines", u32::MAX as usize + 1, 0),
            Err(PipelineError::SheetTooLarge { .. })
        ));
    }

    #[test]
    fn too_many_columns_is_an_error() {
        let columns: Vec<String> = (0..16_385).map(|i| format!("C{}", i)).collect();
        let tables = vec![Table {
            name: "Listings".to_string(),
            columns,
            rows: Vec::new(),
        }];
        assert!(serialize(&tables).is_err());
    }

    #[test]
    fn no_tables_still_well_formed() {
        let bytes = serialize(&[]).unwrap();
        assert!(!bytes.is_empty());
        let wb = open(bytes);
        assert!(wb.sheet_names().len() <= 1);
    }

    #[test]
    fn oversized_strings_clipped() {
        let long = "x".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(clip(&long).chars().count(), MAX_CELL_CHARS);
        let tables = vec![table("Engines", &["NOTE"], vec![vec![json!(long)]])];
        assert!(serialize(&tables).is_ok());
    }
}
