//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) reproduces the
//! well-known layout under `data/`:
//!
//! ```toml
//! variant = "features"
//!
//! [paths]
//! events = "out/events.csv"
//!
//! [extraction]
//! max_review_lines = 10000
//!
//! [features]
//! user_min_events = 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cleaning::features::FeatureCleaning;
use crate::cleaning::ingestion::IngestionCleaning;
use crate::cleaning::CleaningVariant;
use crate::download::DownloadConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::ingestion::ExtractionOptions;

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataPaths {
    /// Directory the downloader writes archives into.
    pub raw_dir: PathBuf,
    pub reviews_archive: PathBuf,
    pub metadata_archive: PathBuf,
    pub events_raw: PathBuf,
    pub items_raw: PathBuf,
    /// Cleaned event table.
    pub events: PathBuf,
}

impl DataPaths {
    /// The default layout re-rooted at `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let raw = root.join("data").join("raw");
        let processed = root.join("data").join("processed");
        Self {
            reviews_archive: raw.join("reviews_Electronics_5.json.gz"),
            metadata_archive: raw.join("meta_Electronics.json.gz"),
            raw_dir: raw,
            events_raw: processed.join("events_raw.csv"),
            items_raw: processed.join("items_raw.csv"),
            events: processed.join("events.csv"),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::under("")
    }
}

/// Top-level configuration shared by the binaries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: DataPaths,
    pub extraction: ExtractionOptions,
    pub ingestion: IngestionCleaning,
    pub features: FeatureCleaning,
    /// Pipeline run by `clean-events`.
    pub variant: CleaningVariant,
    pub download: DownloadConfig,
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> PipelineResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        match path {
            Some(p) => Self::from_toml_path(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataPaths, PipelineConfig};
    use crate::cleaning::CleaningVariant;
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.paths.events, PathBuf::from("data/processed/events.csv"));
        assert_eq!(
            cfg.paths.reviews_archive,
            PathBuf::from("data/raw/reviews_Electronics_5.json.gz")
        );
        assert_eq!(cfg.extraction.max_review_lines, Some(500_000));
        assert_eq!(cfg.extraction.max_items, None);
        assert_eq!(cfg.ingestion.valid_event_types, vec!["purchase".to_string()]);
        assert_eq!(cfg.features.user_min_events, 3);
        assert_eq!(cfg.features.item_min_events, 5);
        assert_eq!(cfg.variant, CleaningVariant::Ingestion);
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
variant = "features"

[paths]
events = "out/events.csv"

[extraction]
max_items = 100

[features]
item_min_events = 2
"#,
        )
        .unwrap();

        assert_eq!(cfg.variant, CleaningVariant::Features);
        assert_eq!(cfg.paths.events, PathBuf::from("out/events.csv"));
        assert_eq!(cfg.paths.events_raw, PathBuf::from("data/processed/events_raw.csv"));
        assert_eq!(cfg.extraction.max_items, Some(100));
        assert_eq!(cfg.extraction.max_review_lines, Some(500_000));
        assert_eq!(cfg.features.item_min_events, 2);
        assert_eq!(cfg.features.user_min_events, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_toml_str("[paths]\nevnts = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("config"));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = PipelineConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::Open { .. }));
    }

    #[test]
    fn under_reroots_every_path() {
        let paths = DataPaths::under("/srv");
        assert_eq!(paths.raw_dir, PathBuf::from("/srv/data/raw"));
        assert_eq!(paths.items_raw, PathBuf::from("/srv/data/processed/items_raw.csv"));
    }
}
