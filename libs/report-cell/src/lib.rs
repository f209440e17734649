// =====================================================================================
// REPORT CELL - RUN SUMMARY OUTPUT
// =====================================================================================
//
// Turns a finished `MetricsSnapshot` into:
// - `summary.json`  full machine-readable dump
// - a condensed text summary for stdout
//
// The HTML report is goose's own; this cell only decides where it lands.
//
// =====================================================================================

pub mod services;

pub use services::json::{write_json, JSON_SUMMARY_FILE};
pub use services::text::text_summary;
pub use services::{prepare_results_dir, HTML_REPORT_FILE};
