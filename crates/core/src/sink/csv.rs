//! CSV export of flat records.
//!
//! The header row is the key order of the first record. Keys that only appear in later records
//! are ignored and keys missing from a record become empty cells. Quoting follows RFC 4180.

use super::{Export, CSV_MIME};
use crate::filename::csv_filename;
use crate::{PrintError, PrintResult};
use serde_json::{Map, Value};

fn cell(value: Option<&Value>) -> PrintResult<String> {
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => serde_json::to_string(nested).map_err(PrintError::Serialization)?,
    })
}

fn as_object(index: usize, record: &Value) -> PrintResult<&Map<String, Value>> {
    record.as_object().ok_or_else(|| {
        PrintError::InvalidInput(format!("record {index} is not an object"))
    })
}

/// Serializes `records` to CSV text.
pub fn records_to_csv(records: &[Value]) -> PrintResult<String> {
    let first = records.first().ok_or(PrintError::EmptyExport)?;
    let header: Vec<&String> = as_object(0, first)?.keys().collect();

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for (index, record) in records.iter().enumerate() {
        let record = as_object(index, record)?;
        let row = header
            .iter()
            .map(|key| cell(record.get(key.as_str())))
            .collect::<PrintResult<Vec<String>>>()?;
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PrintError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PrintError::CsvBuffer(e.to_string()))
}

/// Exports `records` as `{filename}.csv`. An empty slice is an error.
pub fn export_to_csv(records: &[Value], filename: &str) -> PrintResult<Export> {
    let text = records_to_csv(records)?;
    let filename = csv_filename(filename);
    tracing::info!(filename = %filename, rows = records.len(), "csv exported");
    Ok(Export {
        filename,
        mime: CSV_MIME,
        bytes: text.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_flat_records_in_first_record_key_order() {
        let records = vec![json!({"a": 1, "b": "x"}), json!({"a": 2, "b": "y"})];
        let text = records_to_csv(&records).unwrap();
        assert_eq!(text, "a,b\n1,x\n2,y\n");

        let mut reader = ::csv::Reader::from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, vec!["a", "b"]);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows, vec![vec!["1", "x"], vec!["2", "y"]]);
    }

    #[test]
    fn quotes_special_characters_and_fills_missing_cells() {
        let records = vec![
            json!({"name": "Obi, Amara", "note": "said \"ok\"", "active": true}),
            json!({"name": "Line\nbreak", "extra": "ignored", "active": null}),
        ];
        let text = records_to_csv(&records).unwrap();
        assert_eq!(
            text,
            "name,note,active\n\"Obi, Amara\",\"said \"\"ok\"\"\",true\n\"Line\nbreak\",,\n"
        );
    }

    #[test]
    fn nested_values_become_compact_json() {
        let records = vec![json!({"tags": ["a", "b"], "meta": {"k": 1}})];
        let text = records_to_csv(&records).unwrap();
        assert_eq!(text, "tags,meta\n\"[\"\"a\"\",\"\"b\"\"]\",\"{\"\"k\"\":1}\"\n");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            export_to_csv(&[], "patients"),
            Err(PrintError::EmptyExport)
        ));
    }

    #[test]
    fn export_names_the_file() {
        let export = export_to_csv(&[json!({"a": 1})], "patients").unwrap();
        assert_eq!(export.filename, "patients.csv");
        assert_eq!(export.mime, "text/csv;charset=utf-8");
    }
}
