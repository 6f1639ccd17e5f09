//! Output formatting for CLI

use crate::document::Document;
use crate::models::{RecordDataModel, Value};

/// Full record as pretty JSON
pub fn format_record(record: &RecordDataModel) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::String(v) => format!("{:?}", v),
        Value::Pair(p) => match &p.second {
            Some(second) => format!("({}, {:?})", p.first, second),
            None => format!("({}, -)", p.first),
        },
    }
}

/// One line per record: id, Int, String and the active Value variant
pub fn format_record_table(records: &[RecordDataModel]) -> String {
    let mut output = format!("Records ({}):\n", records.len());
    output.push_str(&format!(
        "{:<24}  {:>11}  {:<20}  {}\n",
        "ID", "INT", "STRING", "VALUE"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for record in records {
        let id = record.id().map(|id| id.to_string()).unwrap_or_default();
        let mut string = record.string.clone();
        if string.chars().count() > 20 {
            string = string.chars().take(17).collect::<String>() + "...";
        }
        output.push_str(&format!(
            "{:<24}  {:>11}  {:<20}  {}: {}\n",
            id,
            record.int,
            string,
            record.value.kind(),
            describe_value(&record.value)
        ));
    }

    output
}
