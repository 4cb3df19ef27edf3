//! Within command - mean within-cluster sum of squares from point lines only.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;

use super::{open_dump, print_success, report_error, resolve_measure};
use crate::config::Settings;
use crate::evaluate::mean_within_sum_square;
use crate::io::{ExitCode, OutputFormat};

#[derive(Debug, Serialize)]
struct WithinOutput {
    #[serde(rename = "Mean Within Sum Square (MWSS)")]
    mean_within_sum_square: f64,
}

/// Run within command
pub fn run(dump: &Path, measure: Option<&str>, json: bool, settings: &Settings) -> ExitCode {
    let format = OutputFormat::from_json_flag(json, settings.output.format);
    let started = Instant::now();

    let result = resolve_measure(measure, settings).and_then(|measure| {
        let reader = open_dump(dump)?;
        let mwss = mean_within_sum_square(reader, measure)
            .with_context(|| format!("Failed to read point distances from {}", dump.display()))?;
        Ok((measure, mwss))
    });

    match result {
        Ok((measure, mwss)) => print_success(
            WithinOutput {
                mean_within_sum_square: mwss,
            },
            format,
            measure,
            dump,
            started,
            |out| format!("Mean Within Sum Square (MWSS): {}", out.mean_within_sum_square),
        ),
        Err(e) => report_error(&e, format),
    }
}
