//! Between command - mean between-cluster sum of squares against a k=1 dump.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;

use super::{open_dump, print_success, report_error, resolve_measure};
use crate::config::Settings;
use crate::evaluate::mean_between_against_reference;
use crate::io::{ExitCode, OutputFormat};

#[derive(Debug, Serialize)]
struct BetweenOutput {
    #[serde(rename = "Mean Between Sum Square (MBSS)")]
    mean_between_sum_square: f64,
    reference: String,
}

/// Run between command
pub fn run(
    dump: &Path,
    reference: &Path,
    measure: Option<&str>,
    json: bool,
    settings: &Settings,
) -> ExitCode {
    let format = OutputFormat::from_json_flag(json, settings.output.format);
    let started = Instant::now();

    let result = resolve_measure(measure, settings).and_then(|measure| {
        let reader = open_dump(dump)?;
        let reference_reader = open_dump(reference)?;
        let mbss = mean_between_against_reference(reader, reference_reader, measure)
            .with_context(|| {
                format!(
                    "Failed to compare {} against {}",
                    dump.display(),
                    reference.display()
                )
            })?;
        Ok((measure, mbss))
    });

    match result {
        Ok((measure, mbss)) => print_success(
            BetweenOutput {
                mean_between_sum_square: mbss,
                reference: reference.display().to_string(),
            },
            format,
            measure,
            dump,
            started,
            |out| format!("Mean Between Sum Square (MBSS): {}", out.mean_between_sum_square),
        ),
        Err(e) => report_error(&e, format),
    }
}
