pub mod json;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use shared_models::LoadTestError;

/// Written by goose itself at the end of the attack.
pub const HTML_REPORT_FILE: &str = "report.html";

/// Creates `dir` and returns where goose should write its HTML report.
pub fn prepare_results_dir(dir: &Path) -> Result<PathBuf, LoadTestError> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(HTML_REPORT_FILE))
}

pub(crate) fn write_artifact(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, LoadTestError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, contents)?;

    info!("Wrote {}", path.display());
    Ok(path)
}
