//! JSON records to polars `DataFrame`.
//!
//! One row per record, one column per (flattened) field. Nested objects become
//! `parent.child` columns, recursively; empty nested objects contribute no
//! column. Columns keep first-seen order across records and missing fields are
//! null. A record with no fields still counts as a row. When a literal dotted
//! key and a nested path flatten to the same name, the later field wins and a
//! warning is logged.
//!
//! Column dtype is picked from the non-null values:
//! - every value an integer -> Int64
//! - every value a number -> Float64
//! - every value a bool -> Boolean
//! - anything else -> String, non-string values rendered as JSON text

use std::collections::HashMap;

use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Gen3Error, Result};

const SEPARATOR: char = '.';

/// Flatten an export `data` payload (array of records, single record, or null).
pub fn flatten_records(data: &Value) -> Result<DataFrame> {
    let records: Vec<&Map<String, Value>> = match data {
        Value::Null => Vec::new(),
        Value::Object(record) => vec![record],
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_object()
                    .ok_or_else(|| Gen3Error::Table(format!("record {} is not a JSON object: {}", idx, item)))
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(Gen3Error::Table(format!(
                "expected an array of records, found {}",
                other
            )))
        }
    };

    if records.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut names: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Option<&Value>>> = Vec::new();
    let mut last_row: Vec<Option<usize>> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let mut fields = Vec::new();
        flatten_object(None, record, &mut fields);

        for (name, value) in fields {
            let col = *index.entry(name.clone()).or_insert_with(|| {
                names.push(name);
                cells.push(vec![None; records.len()]);
                last_row.push(None);
                cells.len() - 1
            });
            if last_row[col] == Some(row) {
                warn!(column = %names[col], row, "duplicate flattened column, keeping the later value");
            }
            last_row[col] = Some(row);
            cells[col][row] = Some(value).filter(|v| !v.is_null());
        }
    }

    if names.is_empty() {
        return Ok(DataFrame::empty_with_height(records.len()));
    }

    let columns = names
        .iter()
        .zip(cells.iter())
        .map(|(name, values)| build_column(name, values))
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn flatten_object<'a>(prefix: Option<&str>, record: &'a Map<String, Value>, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in record {
        let name = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_object(Some(&name), nested, out),
            _ => out.push((name, value)),
        }
    }
}

fn build_column(name: &str, values: &[Option<&Value>]) -> Column {
    let mut present = values.iter().flatten().peekable();

    let series = if present.peek().is_none() {
        Series::new(name.into(), vec![None::<String>; values.len()])
    } else if present.clone().all(|v| v.is_i64()) {
        let ints: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
        Series::new(name.into(), ints)
    } else if present.clone().all(|v| v.is_number()) {
        let floats: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
        Series::new(name.into(), floats)
    } else if present.all(|v| v.is_boolean()) {
        let bools: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
        Series::new(name.into(), bools)
    } else {
        let strings: Vec<Option<String>> = values.iter().map(|v| v.map(value_to_text)).collect();
        Series::new(name.into(), strings)
    };

    series.into_column()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
