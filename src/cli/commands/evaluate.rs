//! Evaluate command - aggregate metrics for one dump.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

use super::{open_dump, print_success, report_error, resolve_measure};
use crate::config::Settings;
use crate::evaluate::{ClusterEvaluator, ClusterReport, Evaluation, Metrics};
use crate::io::{ExitCode, OutputFormat};

/// JSON payload of the evaluate command.
#[derive(Debug, Serialize)]
struct EvaluateOutput {
    #[serde(flatten)]
    metrics: Metrics,
    total_points: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    clusters: Option<Vec<ClusterReport>>,
}

/// Run evaluate command
pub fn run(
    dump: &Path,
    measure: Option<&str>,
    json: bool,
    clusters: bool,
    settings: &Settings,
) -> ExitCode {
    let format = OutputFormat::from_json_flag(json, settings.output.format);
    let show_clusters = clusters || settings.evaluation.show_clusters;
    let started = Instant::now();

    let evaluation = match execute(dump, measure, settings) {
        Ok(evaluation) => evaluation,
        Err(e) => return report_error(&e, format),
    };
    crate::log_event!(
        "evaluate",
        "finished",
        "{} in {}ms",
        dump.display(),
        started.elapsed().as_millis()
    );

    let measure = evaluation.measure;
    let output = EvaluateOutput {
        metrics: evaluation.metrics,
        total_points: evaluation.total_points,
        clusters: show_clusters.then_some(evaluation.clusters),
    };
    print_success(output, format, measure, dump, started, render_text)
}

fn execute(dump: &Path, measure: Option<&str>, settings: &Settings) -> anyhow::Result<Evaluation> {
    // Resolve the measure before touching the file
    let evaluator = ClusterEvaluator::new(resolve_measure(measure, settings)?);
    let reader = open_dump(dump)?;
    evaluator
        .evaluate_detailed(reader)
        .with_context(|| format!("Failed to evaluate {}", dump.display()))
}

fn render_text(output: &EvaluateOutput) -> String {
    let mut text = format_metrics(&output.metrics);
    if let Some(clusters) = &output.clusters {
        text.push('\n');
        text.push_str(&cluster_table(clusters).to_string());
    }
    text
}

pub(crate) fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "Mean Between Sum Square (MBSS): {}\nMean Within Sum Square (MWSS): {}",
        metrics.mean_between_sum_square, metrics.mean_within_sum_square
    )
}

fn cluster_table(clusters: &[ClusterReport]) -> Table {
    let optional = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.6}"));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Cluster", "Points", "Observed", "SSE", "Min", "Max", "BSS"]);

    for c in clusters {
        table.add_row(vec![
            c.label.clone(),
            c.npoints.to_string(),
            c.observed_points.to_string(),
            format!("{:.6}", c.sse),
            optional(c.min),
            optional(c.max),
            format!("{:.6}", c.bss),
        ]);
    }
    table
}
