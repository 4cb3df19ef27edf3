//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module and returns the process
//! exit code instead of exiting itself.

pub mod between;
pub mod evaluate;
pub mod init;
pub mod within;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;

use super::Commands;
use crate::config::Settings;
use crate::io::{Envelope, ExitCode, OutputFormat};
use crate::vector::DistanceMeasure;

/// Run a parsed command against the loaded settings.
pub fn dispatch(command: Commands, settings: &Settings) -> ExitCode {
    match command {
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(settings),
        Commands::Evaluate {
            dump,
            measure,
            json,
            clusters,
        } => evaluate::run(&dump, measure.as_deref(), json, clusters, settings),
        Commands::Within {
            dump,
            measure,
            json,
        } => within::run(&dump, measure.as_deref(), json, settings),
        Commands::Between {
            dump,
            reference,
            measure,
            json,
        } => between::run(&dump, &reference, measure.as_deref(), json, settings),
    }
}

/// Measure from the command line, falling back to the configured one.
pub(crate) fn resolve_measure(
    cli_measure: Option<&str>,
    settings: &Settings,
) -> anyhow::Result<DistanceMeasure> {
    let name = cli_measure.unwrap_or(&settings.evaluation.measure);
    Ok(name.parse::<DistanceMeasure>()?)
}

/// Open a dump for buffered reading. The file is closed when the reader drops.
pub(crate) fn open_dump(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(crate::EvalError::from)
        .with_context(|| format!("Failed to open dump {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Print a successful result in the selected format.
pub(crate) fn print_success<T: Serialize>(
    data: T,
    format: OutputFormat,
    measure: DistanceMeasure,
    source: &Path,
    started: Instant,
    text: impl FnOnce(&T) -> String,
) -> ExitCode {
    if format.is_json() {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let envelope = Envelope::success(data)
            .with_measure(measure.name())
            .with_source(source.display().to_string())
            .with_duration_ms(duration_ms);
        match envelope.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing output: {e}");
                return ExitCode::GeneralError;
            }
        }
    } else {
        println!("{}", text(&data));
    }
    ExitCode::Success
}

/// Report a command failure and classify it.
pub(crate) fn report_error(error: &anyhow::Error, format: OutputFormat) -> ExitCode {
    let code = ExitCode::from_anyhow(error);
    tracing::debug!("[cli] command failed with {code:?}: {error:#}");

    if format.is_json() {
        let envelope: Envelope<()> = Envelope::error(code, format!("{error:#}"));
        match envelope.to_json() {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error: {error:#}"),
        }
    } else {
        eprintln!("Error: {error:#}");
    }
    code
}
