use clap::Parser;
use clustereval::cli::{Cli, commands};
use clustereval::{Settings, logging};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });

    logging::init_with_config(&settings.logging);
    clustereval::debug_event!("config", "loaded", "measure={}", settings.evaluation.measure);

    commands::dispatch(cli.command, &settings).into()
}
