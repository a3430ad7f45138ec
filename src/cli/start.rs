use crate::cli::{
    actions::Action,
    commands,
    dispatch::handler,
    telemetry::{self, LogFormat, Settings},
};
use anyhow::{anyhow, Result};
use tracing::Level;

fn level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Parse arguments, initialize logging and build the action to run.
/// # Errors
/// Returns an error if telemetry cannot be initialized or the arguments are incomplete.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let format = matches
        .get_one::<String>("log-format")
        .map_or(Ok(LogFormat::default()), |format| format.parse::<LogFormat>())
        .map_err(|err| anyhow!(err))?;

    telemetry::init(&Settings {
        level: level(matches.get_one::<u8>("verbosity").copied().unwrap_or(0)),
        format,
        region: matches.get_one::<String>("region").cloned(),
    })?;

    handler(&matches)
}
