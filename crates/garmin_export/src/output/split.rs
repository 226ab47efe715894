//! Per-category split files sharing one metadata header.

use crate::ExportResult;
use crate::aggregate::AggregateRecord;
use crate::history::Category;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

fn metadata(record: &AggregateRecord, category: &str, entries: usize) -> Value {
    json!({
        "fetched_at": record.fetched_at,
        "date_range": record.date_range,
        "category": category,
        "entries": entries,
    })
}

fn write_one(
    record: &AggregateRecord,
    dir: &Path,
    category: &str,
    data: &Value,
    entries: usize,
) -> ExportResult<PathBuf> {
    let body = json!({
        "metadata": metadata(record, category, entries),
        "data": data,
    });
    let path = dir.join(format!("{category}.json"));
    std::fs::write(&path, serde_json::to_string_pretty(&body)?)?;
    Ok(path)
}

/// Write one JSON file per category under `dir`.
pub fn write_split_files(record: &AggregateRecord, dir: &Path) -> ExportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for category in Category::ALL {
        let entries = record.history(category);
        let data = Value::Array(entries.to_vec());
        let path = write_one(record, dir, category.key(), &data, entries.len())?;
        written.push(path);
    }

    for (category, data) in [
        ("activities", &record.activities),
        ("weight_history", &record.weight_history),
        ("blood_pressure", &record.blood_pressure),
    ] {
        let entries = data.as_array().map_or(0, Vec::len);
        let path = write_one(record, dir, category, data, entries)?;
        written.push(path);
    }

    Ok(written)
}
