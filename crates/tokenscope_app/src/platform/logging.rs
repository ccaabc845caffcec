//! Logger setup for the terminal client.
//!
//! Logs go to `./tokenscope.log` by default so they do not interleave with the
//! rendered screen. `TOKENSCOPE_LOG` can redirect them.

use std::path::Path;

use engine_logging::LogDestination;
use log::LevelFilter;
use tokenscope_engine::{log_destination, SettingsError};

const LOG_FILE: &str = "./tokenscope.log";

pub fn initialize() -> Result<(), SettingsError> {
    let destination = log_destination(|key| std::env::var(key).ok(), LogDestination::File)?;
    engine_logging::initialize(destination, LevelFilter::Info, Path::new(LOG_FILE));
    Ok(())
}
