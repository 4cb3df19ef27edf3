//! End-to-end evaluation over dump files shaped like real clusterdump output.

use clustereval::{
    ClusterEvaluator, DistanceMeasure, DumpParser, EvalError, evaluate, evaluate_file,
    mean_between_against_reference, mean_within_sum_square,
};
use std::io::Write;
use tempfile::NamedTempFile;

const EPS: f64 = 1e-9;

const DUMP: &str = r#"[
{"identifier":"VL-12","r":[{"court":0.1},{"judge":0.05}],"c":[{"court":0.8},{"judge":0.6}],"n":3}
	Top Terms:
		court => 0.8
		judge => 0.6
	Weight : [props - optional]:  Point:
	1.0: [distance=0.2]: /reuters/1 = [court:0.9, judge:0.4]
	1.0: [distance=0.1]: /reuters/2 = [court:0.7, judge:0.7]
	1.0: [distance=0.3]: /reuters/3 = [court:1.0]
{"identifier":"VL-40","r":[{"oil":0.2}],"c":[{"oil":0.6},{"price":0.8}],"n":1}
	Top Terms:
		price => 0.8
	Weight : [props - optional]:  Point:
	1.0: [distance=0.4]: /reuters/4 = [oil:0.5, price:0.9]
]
"#;

fn write_dump(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_cosine_evaluation_matches_hand_computation() {
    let metrics = evaluate(DUMP.as_bytes(), "Cosine").unwrap();

    // grand centroid = (3*[0.8,0.6,0,0] + 1*[0,0,0.6,0.8]) / 4
    let g = [0.6, 0.45, 0.15, 0.2];
    let g_norm = g.iter().map(|v: &f64| v * v).sum::<f64>().sqrt();
    let d_a = 1.0 - (0.8 * g[0] + 0.6 * g[1]) / g_norm;
    let d_b = 1.0 - (0.6 * g[2] + 0.8 * g[3]) / g_norm;
    let expected_mbss = (3.0 * d_a * d_a + 1.0 * d_b * d_b) / 4.0;
    let expected_mwss = (0.04 + 0.01 + 0.09 + 0.16) / 4.0;

    assert!((metrics.mean_between_sum_square - expected_mbss).abs() < EPS);
    assert!((metrics.mean_within_sum_square - expected_mwss).abs() < EPS);
}

#[test]
fn test_squared_euclidean_evaluation() {
    let eval = ClusterEvaluator::new(DistanceMeasure::SquaredEuclidean)
        .evaluate_detailed(DUMP.as_bytes())
        .unwrap();

    assert_eq!(eval.total_points, 4);
    assert_eq!(eval.clusters.len(), 2);
    assert_eq!(eval.clusters[0].label, "VL-12");
    assert_eq!(eval.clusters[1].label, "VL-40");

    // Distances are already squared and summed as-is
    assert!((eval.metrics.mean_within_sum_square - 1.0 / 4.0).abs() < EPS);

    let g = &eval.grand_centroid;
    assert!((g.get("court") - 0.6).abs() < EPS);
    assert!((g.get("judge") - 0.45).abs() < EPS);
    assert!((g.get("oil") - 0.15).abs() < EPS);
    assert!((g.get("price") - 0.2).abs() < EPS);

    let bss_a = 3.0
        * ((0.8f64 - 0.6).powi(2)
            + (0.6f64 - 0.45).powi(2)
            + 0.15f64.powi(2)
            + 0.2f64.powi(2));
    let bss_b = 1.0
        * (0.6f64.powi(2)
            + 0.45f64.powi(2)
            + (0.6f64 - 0.15).powi(2)
            + (0.8f64 - 0.2).powi(2));
    assert!((eval.clusters[0].bss - bss_a).abs() < EPS);
    assert!((eval.clusters[1].bss - bss_b).abs() < EPS);
    assert!((eval.metrics.mean_between_sum_square - (bss_a + bss_b) / 4.0).abs() < EPS);
}

#[test]
fn test_parser_records_point_statistics() {
    let clusters = DumpParser::parse_str(DUMP, DistanceMeasure::Cosine).unwrap();
    assert_eq!(clusters.len(), 2);

    let a = &clusters[0];
    assert_eq!(a.npoints, 3);
    assert_eq!(a.observed_points, 3);
    assert!((a.sse - 0.14).abs() < EPS);
    assert!((a.min - 0.01).abs() < EPS);
    assert!((a.max - 0.09).abs() < EPS);

    let b = &clusters[1];
    assert_eq!(b.centroid.get("price"), 0.8);
    assert!((b.sse - 0.16).abs() < EPS);
}

#[test]
fn test_evaluate_file() {
    let file = write_dump(DUMP);
    let from_file = evaluate_file(file.path(), "Cosine").unwrap();
    let from_stream = evaluate(DUMP.as_bytes(), "Cosine").unwrap();
    assert_eq!(from_file, from_stream);
}

#[test]
fn test_evaluate_file_unknown_measure_does_not_open_file() {
    let missing = std::path::Path::new("/nonexistent/clustereval/dump.txt");
    assert!(matches!(
        evaluate_file(missing, "Manhattan"),
        Err(EvalError::UnknownDistanceMeasure(name)) if name == "Manhattan"
    ));
    assert!(matches!(evaluate_file(missing, "Cosine"), Err(EvalError::Io(_))));
}

#[test]
fn test_malformed_centroid_carries_line() {
    let text = "[\n{\"identifier\":\"VL-1\",\"r\":[],\"c\":[{\"a\":1.0},{\"b\":],\"n\":2}\n";
    match evaluate(text.as_bytes(), "Cosine") {
        Err(EvalError::MalformedDump { line, content, .. }) => {
            assert_eq!(line, 2);
            assert!(content.starts_with("{\"identifier\":\"VL-1\""));
        }
        other => panic!("expected MalformedDump, got {other:?}"),
    }
}

#[test]
fn test_no_headers_is_empty_dump() {
    assert!(matches!(
        evaluate("[\n]\n".as_bytes(), "SquaredEuclidean"),
        Err(EvalError::EmptyDump { .. })
    ));
}

#[test]
fn test_point_line_without_header() {
    let text = "\t1.0: [distance=0.2]: /reuters/1\n";
    assert!(matches!(
        evaluate(text.as_bytes(), "Cosine"),
        Err(EvalError::NoActiveCluster { line: 1, .. })
    ));
}

#[test]
fn test_supplementary_measures_agree_with_full_evaluation() {
    let full = evaluate(DUMP.as_bytes(), "SquaredEuclidean").unwrap();

    let mwss = mean_within_sum_square(DUMP.as_bytes(), DistanceMeasure::SquaredEuclidean).unwrap();
    assert!((mwss - full.mean_within_sum_square).abs() < EPS);

    // A k=1 reference whose centroid is the grand centroid reproduces MBSS
    let reference = concat!(
        r#"{"identifier":"VL-0","r":[],"#,
        r#""c":[{"court":0.6},{"judge":0.45},{"oil":0.15},{"price":0.2}],"n":4}"#
    );
    let mbss = mean_between_against_reference(
        DUMP.as_bytes(),
        reference.as_bytes(),
        DistanceMeasure::SquaredEuclidean,
    )
    .unwrap();
    assert!((mbss - full.mean_between_sum_square).abs() < EPS);
}
