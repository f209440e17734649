use std::path::{Path, PathBuf};

use metrics_cell::MetricsSnapshot;
use shared_models::LoadTestError;

use super::write_artifact;

pub const JSON_SUMMARY_FILE: &str = "summary.json";

/// Writes the snapshot as pretty-printed JSON to `<dir>/summary.json`,
/// creating `dir` if needed.
pub fn write_json(snapshot: &MetricsSnapshot, dir: &Path) -> Result<PathBuf, LoadTestError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_artifact(dir, JSON_SUMMARY_FILE, &json)
}
