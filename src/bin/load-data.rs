//! Extract the raw archives into `events_raw.csv` and `items_raw.csv`.
//!
//! Usage: `load-data [config.toml]`

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use purchase_events::config::PipelineConfig;
use purchase_events::driver::run_load;
use purchase_events::logging::init_logging;
use purchase_events::observability::StdOutObserver;
use purchase_events::PipelineResult;

fn run() -> PipelineResult<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    run_load(&config, Some(&StdOutObserver), &mut io::stdout())?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "load-data failed");
            ExitCode::FAILURE
        }
    }
}
