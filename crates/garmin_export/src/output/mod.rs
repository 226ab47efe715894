//! Output artifacts produced from one aggregate record.

use crate::ExportResult;
use crate::aggregate::AggregateRecord;
use std::path::{Path, PathBuf};

pub mod markdown;
pub mod split;
pub mod summary;

#[derive(Clone, Debug)]
pub struct OutputPaths {
    pub full_dump: PathBuf,
    pub summary: PathBuf,
    pub split_dir: PathBuf,
    pub digest: PathBuf,
}

/// Write all four artifact groups under `data_dir`: the full JSON dump, the
/// compact summary, the per-category split files and the Markdown digest.
pub fn write_outputs(record: &AggregateRecord, data_dir: &Path) -> ExportResult<OutputPaths> {
    std::fs::create_dir_all(data_dir)?;

    let full_dump = data_dir.join("garmin_full_data.json");
    std::fs::write(&full_dump, serde_json::to_string_pretty(record)?)?;

    let summary_path = data_dir.join("garmin_summary.json");
    std::fs::write(
        &summary_path,
        serde_json::to_string_pretty(&summary::build_summary(record))?,
    )?;

    let split_dir = data_dir.join("split");
    split::write_split_files(record, &split_dir)?;

    let digest = data_dir.join("health_summary.md");
    std::fs::write(&digest, markdown::render_digest(record))?;

    Ok(OutputPaths {
        full_dump,
        summary: summary_path,
        split_dir,
        digest,
    })
}
