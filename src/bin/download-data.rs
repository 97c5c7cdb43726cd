//! Download the raw review and metadata archives.
//!
//! Usage: `download-data [config.toml]`

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use purchase_events::config::PipelineConfig;
use purchase_events::driver::run_download;
use purchase_events::logging::init_logging;
use purchase_events::PipelineResult;

fn run() -> PipelineResult<ExitCode> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    let summary = run_download(&config, &mut io::stdout().lock())?;
    if summary.failed() > 0 {
        tracing::error!(failed = summary.failed(), "some downloads failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_logging();
    run().unwrap_or_else(|e| {
        tracing::error!(error = %e, "download-data failed");
        ExitCode::FAILURE
    })
}
