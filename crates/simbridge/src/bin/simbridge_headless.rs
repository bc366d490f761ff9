//! # SIMBRIDGE Headless Host
//!
//! Runs one simulation into an in-memory canvas and logs what happened.
//!
//! ```bash
//! # Defaults (bounce, 300 steps)
//! ./simbridge_headless
//!
//! # From a config file, with debug logging
//! RUST_LOG=simbridge=debug ./simbridge_headless config/headless.toml
//! ```

use std::process::ExitCode;

use simbridge::{HostConfig, HostError, HostResult, Session};
use simbridge_render::Canvas;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Recoveries allowed before giving up on a lineage.
const MAX_RECOVERIES: u32 = 3;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match HostConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "cannot load host config");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("no config file given, using defaults");
            HostConfig::default()
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "session failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &HostConfig) -> HostResult<()> {
    let mut session = Session::from_config(config)?;
    let mut canvas = Canvas::new(config.viewport.width, config.viewport.height);
    session.boot()?;

    let mut recoveries = 0;
    let mut completed = 0;
    while completed < config.steps {
        match session.advance(&mut canvas) {
            Ok(frame) => {
                completed += 1;
                if frame.step % 60 == 0 {
                    info!(
                        step = frame.step,
                        population = frame.population,
                        primitives = frame.primitives,
                        "frame"
                    );
                }
            }
            Err(HostError::Lifecycle(err)) if recoveries < MAX_RECOVERIES => {
                recoveries += 1;
                warn!(%err, recoveries, "step failed, recovering");
                session.recover()?;
            }
            Err(err) => return Err(err),
        }
    }

    let stats = session.stats();
    info!(
        engine = %session.kind(),
        steps = completed,
        calls = stats.calls,
        growth_retries = stats.growth_retries,
        failures = stats.failures,
        bytes = stats.bytes_delivered,
        retained = session.history().len(),
        "simulation complete"
    );

    if let (Some(path), Some(replay)) = (&config.replay, session.replay()) {
        replay.save(path)?;
    }
    Ok(())
}
