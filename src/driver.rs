//! Orchestration behind the three binaries.
//!
//! Each `run_*` function takes the configuration explicitly and writes its human-readable
//! report to `out`; stage-level progress goes through the optional observer.

use std::io::Write;

use tracing::info;

use crate::cleaning::features::features_pipeline;
use crate::cleaning::ingestion::ingestion_pipeline;
use crate::cleaning::{CleaningReport, CleaningVariant};
use crate::config::PipelineConfig;
use crate::download::{download_dataset, DownloadSummary};
use crate::error::PipelineResult;
use crate::features::event_type_counts;
use crate::ingestion::{extract_items, extract_reviews, ExtractionReport};
use crate::observability::PipelineObserver;
use crate::report::{self, thousands};
use crate::stats::EventStats;
use crate::store;

/// Fetch the raw archives into `config.paths.raw_dir`.
pub fn run_download(config: &PipelineConfig, out: &mut dyn Write) -> PipelineResult<DownloadSummary> {
    writeln!(out, "Starting download of Amazon Electronics reviews dataset...")?;
    writeln!(out, "This may take a few minutes depending on your connection speed.\n")?;

    let mut write_err = None;
    let summary = download_dataset(&config.download, &config.paths.raw_dir, |outcome| {
        let line = match &outcome.result {
            Ok(d) => format!("✓ Downloaded {} ({:.2} MB)\n", outcome.file_name, d.size_mb()),
            Err(e) => format!("✗ Failed to download {}: {e}\n", outcome.file_name),
        };
        let res = writeln!(out, "Downloading {}...\nURL: {}\n{line}", outcome.file_name, outcome.url);
        if let Err(e) = res {
            if write_err.is_none() {
                write_err = Some(e);
            }
        }
    })?;
    if let Some(e) = write_err {
        return Err(e.into());
    }

    writeln!(out, "Download complete!")?;
    writeln!(out, "Files saved to: {}", config.paths.raw_dir.display())?;
    Ok(summary)
}

/// Row counts and diagnostics of a load run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub events: usize,
    pub items: usize,
    pub reviews_report: ExtractionReport,
    pub metadata_report: ExtractionReport,
}

/// Extract both archives and write `events_raw.csv` and `items_raw.csv`.
pub fn run_load(
    config: &PipelineConfig,
    observer: Option<&dyn PipelineObserver>,
    out: &mut dyn Write,
) -> PipelineResult<LoadOutcome> {
    let paths = &config.paths;

    writeln!(out, "Loading reviews as events...")?;
    let events = extract_reviews(&paths.reviews_archive, &config.extraction, observer)?;
    writeln!(out, "✓ Loaded {} purchase events", thousands(events.table.row_count()))?;

    writeln!(out, "\n\nLoading product metadata...")?;
    let items = extract_items(&paths.metadata_archive, &config.extraction, observer)?;
    if items.table.is_empty() {
        writeln!(out, "⚠ No valid items found in metadata file")?;
    } else {
        writeln!(out, "✓ Loaded {} product items", thousands(items.table.row_count()))?;
    }

    writeln!(out, "\n\nSaving processed data...")?;
    store::save_events(&paths.events_raw, &events.table)?;
    writeln!(out, "✓ Saved {}", paths.events_raw.display())?;
    store::save_items(&paths.items_raw, &items.table)?;
    writeln!(out, "✓ Saved {}", paths.items_raw.display())?;
    writeln!(out, "\n✅ Data processing complete!")?;

    Ok(LoadOutcome {
        events: events.table.row_count(),
        items: items.table.row_count(),
        reviews_report: events.report,
        metadata_report: items.report,
    })
}

/// Result of a clean run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub variant: CleaningVariant,
    pub report: CleaningReport,
    /// Only the ingestion variant computes statistics.
    pub stats: Option<EventStats>,
}

/// Load `events_raw.csv`, run the configured variant and write `events.csv`.
pub fn run_clean(
    config: &PipelineConfig,
    observer: Option<&dyn PipelineObserver>,
    out: &mut dyn Write,
) -> PipelineResult<CleanOutcome> {
    let paths = &config.paths;
    let pipeline = match config.variant {
        CleaningVariant::Ingestion => {
            writeln!(out, "{}", report::pipeline_header())?;
            ingestion_pipeline(&config.ingestion)
        }
        CleaningVariant::Features => features_pipeline(&config.features),
    };
    info!(variant = %config.variant, input = %paths.events_raw.display(), "cleaning events");

    let raw = store::load_events(&paths.events_raw)?;
    writeln!(out, "Loaded {} raw events", thousands(raw.row_count()))?;

    let cleaned = pipeline.run(raw, observer)?;
    store::save_events(&paths.events, &cleaned.events)?;

    match &cleaned.stats {
        Some(stats) => {
            writeln!(out, "{}", report::saved_block(cleaned.events.row_count(), &paths.events))?;
            writeln!(out, "{}", report::summary_block(stats))?;
        }
        None => {
            let distribution = event_type_counts(&cleaned.events)?;
            writeln!(
                out,
                "{}",
                report::complete_block(
                    cleaned.report.rows_in,
                    &cleaned.events,
                    cleaned.report.reduction_pct(),
                    &paths.events,
                    &distribution,
                )
            )?;
        }
    }

    Ok(CleanOutcome {
        variant: config.variant,
        report: cleaned.report,
        stats: cleaned.stats,
    })
}
