//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Cluster dump quality evaluation
#[derive(Parser)]
#[command(
    name = "clustereval",
    version = env!("CARGO_PKG_VERSION"),
    about = "Evaluate k-means cluster dumps",
    long_about = "Compute mean between-cluster and within-cluster sums of squares \
                  from a k-means cluster dump.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .clustereval directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,

    /// Evaluate a cluster dump
    #[command(about = "Compute MBSS and MWSS for a cluster dump")]
    Evaluate {
        /// Cluster dump file
        #[arg(value_name = "DUMP")]
        dump: PathBuf,

        /// Distance measure: Cosine or SquaredEuclidean (overrides config)
        #[arg(short, long)]
        measure: Option<String>,

        /// Output JSON envelope
        #[arg(long)]
        json: bool,

        /// Also print per-cluster statistics
        #[arg(long)]
        clusters: bool,
    },

    /// Mean within-cluster sum of squares over all point lines
    #[command(about = "Compute MWSS from point distances only")]
    Within {
        #[arg(value_name = "DUMP")]
        dump: PathBuf,

        /// Distance measure: Cosine or SquaredEuclidean (overrides config)
        #[arg(short, long)]
        measure: Option<String>,

        /// Output JSON envelope
        #[arg(long)]
        json: bool,
    },

    /// Mean between-cluster sum of squares against a reference centre
    #[command(about = "Compute MBSS against the centroid of a single-cluster dump")]
    Between {
        #[arg(value_name = "DUMP")]
        dump: PathBuf,

        /// Dump of a k=1 run over the same data; its centroid is the centre of mass
        #[arg(short, long, value_name = "K1_DUMP")]
        reference: PathBuf,

        /// Distance measure: Cosine or SquaredEuclidean (overrides config)
        #[arg(short, long)]
        measure: Option<String>,

        /// Output JSON envelope
        #[arg(long)]
        json: bool,
    },
}
