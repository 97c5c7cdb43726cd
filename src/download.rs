//! Dataset acquisition.
//!
//! Fetches the review and metadata archives over HTTP into the raw data directory. One
//! failed download does not stop the next one; [`DownloadSummary::failed`] tells the
//! caller whether the run as a whole succeeded.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{PipelineError, PipelineResult};

const SNAP_BASE: &str = "http://snap.stanford.edu/data/amazon/productGraph/categoryFiles";

/// Source URLs of the two archives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    pub reviews_url: String,
    pub metadata_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            reviews_url: format!("{SNAP_BASE}/reviews_Electronics_5.json.gz"),
            metadata_url: format!("{SNAP_BASE}/meta_Electronics.json.gz"),
            timeout_secs: 3600,
        }
    }
}

impl DownloadConfig {
    fn urls(&self) -> [&str; 2] {
        [&self.reviews_url, &self.metadata_url]
    }
}

/// A file that was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

impl Downloaded {
    pub fn size_mb(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Outcome of one URL.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub file_name: String,
    pub url: String,
    pub result: PipelineResult<Downloaded>,
}

/// Outcome of a whole download run.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub outcomes: Vec<DownloadOutcome>,
}

impl DownloadSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Last path segment of `url`, used as the local file name.
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Download every configured archive into `raw_dir`, creating it if needed.
///
/// `on_outcome` is called after each URL, successful or not.
pub fn download_dataset(
    config: &DownloadConfig,
    raw_dir: &Path,
    mut on_outcome: impl FnMut(&DownloadOutcome),
) -> PipelineResult<DownloadSummary> {
    fs::create_dir_all(raw_dir).map_err(|source| PipelineError::Create {
        path: raw_dir.to_path_buf(),
        source,
    })?;
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let mut summary = DownloadSummary::default();
    for url in config.urls() {
        let file_name = file_name_from_url(url).unwrap_or("download.bin").to_string();
        let dest = raw_dir.join(&file_name);
        info!(%url, dest = %dest.display(), "downloading");

        let result = fetch(&client, url, &dest);
        match &result {
            Ok(d) => info!(path = %d.path.display(), bytes = d.bytes, "download finished"),
            Err(e) => error!(%url, error = %e, "download failed"),
        }
        let outcome = DownloadOutcome {
            file_name,
            url: url.to_string(),
            result,
        };
        on_outcome(&outcome);
        summary.outcomes.push(outcome);
    }
    Ok(summary)
}

fn fetch(client: &Client, url: &str, dest: &Path) -> PipelineResult<Downloaded> {
    let mut response = client.get(url).send()?.error_for_status()?;
    let file = File::create(dest).map_err(|source| PipelineError::Create {
        path: dest.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let bytes = response.copy_to(&mut writer)?;
    writer.flush()?;
    Ok(Downloaded {
        path: dest.to_path_buf(),
        bytes,
    })
}
