//! Writes one run's batch of business records to disk.
use crate::model::BusinessResult;
use chrono::{DateTime, Local};
use mapreviews_common::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a batch written at `at`.
pub fn batch_file_name(at: DateTime<Local>) -> String {
    format!("reviews_results_{}.json", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Serialize `results` as pretty UTF-8 JSON into `dir`.
///
/// Nothing is written for an empty batch and `Ok(None)` is returned.
pub async fn write_batch(
    dir: &Path,
    results: &[BusinessResult],
    at: DateTime<Local>,
) -> Result<Option<PathBuf>> {
    if results.is_empty() {
        info!(target: "output", "no results to save");
        return Ok(None);
    }

    let body = serde_json::to_string_pretty(results)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(batch_file_name(at));
    tokio::fs::write(&path, body).await?;

    info!(target: "output", path = %path.display(), businesses = results.len(), "results saved");
    Ok(Some(path))
}
