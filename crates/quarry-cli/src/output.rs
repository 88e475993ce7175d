// crates/quarry-cli/src/output.rs
//
// Output formatting for the quarry CLI: tables for people, JSON for scripts.

use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One `key: value` row, used for single-record results.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct Field {
    pub field: String,
    pub value: String,
}

impl Field {
    pub fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Print a single record: a two-column table, or a JSON object.
pub fn print_record(format: OutputFormat, fields: &[Field]) {
    match format {
        OutputFormat::Table => println!("{}", format_table(fields)),
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|f| (f.field.clone(), serde_json::Value::String(f.value.clone())))
                .collect();
            println!("{}", format_json(&object));
        }
    }
}
