//! Line-oriented cluster-dump parser.
//!
//! Two kinds of lines matter, each recognized by a marker substring:
//!
//! ```text
//! {"identifier":"VL-3","r":[{"a":0.1}],"c":[{"a":0.5},{"b":0.2}],"n":2}
//!     1.0 : [distance=0.3183]
//! ```
//!
//! A header line opens a new cluster, a point line adds one distance to the
//! cluster opened most recently. Every other line is skipped. The parser is a
//! two-state machine: before the first header it is awaiting a cluster, after
//! it there is always a current cluster.

use std::collections::HashSet;
use std::io::BufRead;

use tracing::{debug, trace, warn};

use super::centroid::parse_centroid;
use super::record::ClusterRecord;
use crate::error::{EvalError, EvalResult};
use crate::vector::{DistanceMeasure, SparseVector};

pub const IDENTIFIER_MARKER: &str = "\"identifier\":\"";
pub const CENTROID_MARKER: &str = "],\"c\":";
pub const COUNT_MARKER: &str = "\"n\":";
pub const DISTANCE_MARKER: &str = "[distance=";

/// Fields extracted from a cluster header line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHeader {
    pub label: String,
    pub centroid: SparseVector,
    pub npoints: u64,
}

/// Read the label, centroid and point count from a header line.
///
/// The error is the human-readable reason; callers attach line context.
pub fn parse_header(line: &str) -> Result<ClusterHeader, String> {
    let start = line
        .find(IDENTIFIER_MARKER)
        .ok_or_else(|| "missing identifier".to_string())?
        + IDENTIFIER_MARKER.len();
    let after_identifier = &line[start..];

    let label_end = after_identifier.find(',').unwrap_or(after_identifier.len());
    let label = after_identifier[..label_end].replace('"', "").trim().to_string();
    if label.is_empty() {
        return Err("empty cluster identifier".to_string());
    }

    let centroid_start = after_identifier
        .find(CENTROID_MARKER)
        .ok_or_else(|| "missing centroid field".to_string())?
        + CENTROID_MARKER.len();
    let centroid_text = &after_identifier[centroid_start..];
    let (centroid, consumed) = parse_centroid(centroid_text).map_err(|e| e.to_string())?;

    let tail = &centroid_text[consumed..];
    let count_start = tail
        .find(COUNT_MARKER)
        .ok_or_else(|| "missing point count".to_string())?
        + COUNT_MARKER.len();
    let count_text = &tail[count_start..];
    let count_end = count_text.find(['}', ',']).unwrap_or(count_text.len());
    let count_text = count_text[..count_end].trim();
    let npoints = count_text
        .parse::<u64>()
        .map_err(|_| format!("point count '{count_text}' is not a non-negative integer"))?;

    Ok(ClusterHeader {
        label,
        centroid,
        npoints,
    })
}

/// Read the raw distance from a point line.
pub fn parse_point_distance(line: &str) -> Result<f64, String> {
    let start = line
        .find(DISTANCE_MARKER)
        .ok_or_else(|| "missing distance".to_string())?
        + DISTANCE_MARKER.len();
    let rest = &line[start..];
    let end = rest
        .find(']')
        .ok_or_else(|| "unterminated distance field".to_string())?;
    let text = rest[..end].trim();

    match text.parse::<f64>() {
        Ok(d) if d.is_finite() => Ok(d),
        Ok(_) => Err(format!("distance '{text}' is not finite")),
        Err(_) => Err(format!("distance '{text}' is not a number")),
    }
}

/// Lines of a dump read as bytes, numbered from 1.
///
/// Header lines must be valid UTF-8. Any other line is decoded lossily, so a
/// stray byte in a point's document path does not stop the read.
pub struct DumpLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> DumpLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }

    fn decode(&self) -> EvalResult<String> {
        let mut bytes = self.buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        match std::str::from_utf8(bytes) {
            Ok(line) => Ok(line.to_string()),
            Err(_) => {
                let line = String::from_utf8_lossy(bytes).into_owned();
                if line.contains(IDENTIFIER_MARKER) {
                    return Err(EvalError::malformed(
                        self.line_number,
                        &line,
                        "cluster header is not valid UTF-8",
                    ));
                }
                Ok(line)
            }
        }
    }
}

impl<R: BufRead> Iterator for DumpLines<R> {
    type Item = EvalResult<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                Some(self.decode().map(|line| (self.line_number, line)))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    AwaitingCluster,
    WithinCluster(usize),
}

/// Incremental dump parser producing cluster records in input order.
#[derive(Debug)]
pub struct DumpParser {
    measure: DistanceMeasure,
    state: ParserState,
    clusters: Vec<ClusterRecord>,
    labels: HashSet<String>,
    declared_points: u64,
    line_number: usize,
}

impl DumpParser {
    pub fn new(measure: DistanceMeasure) -> Self {
        Self {
            measure,
            state: ParserState::AwaitingCluster,
            clusters: Vec::new(),
            labels: HashSet::new(),
            declared_points: 0,
            line_number: 0,
        }
    }

    /// Parse a whole reader line by line.
    pub fn parse<R: BufRead>(
        reader: R,
        measure: DistanceMeasure,
    ) -> EvalResult<Vec<ClusterRecord>> {
        let mut parser = Self::new(measure);
        for line in DumpLines::new(reader) {
            let (_, line) = line?;
            parser.feed_line(&line)?;
        }
        Ok(parser.finish())
    }

    pub fn parse_str(text: &str, measure: DistanceMeasure) -> EvalResult<Vec<ClusterRecord>> {
        Self::parse(text.as_bytes(), measure)
    }

    /// Consume one line of input.
    pub fn feed_line(&mut self, line: &str) -> EvalResult<()> {
        self.line_number += 1;

        if line.contains(IDENTIFIER_MARKER) {
            self.open_cluster(line)?;
        }
        if line.contains(DISTANCE_MARKER) {
            self.record_point(line)?;
        }
        Ok(())
    }

    /// Clusters parsed so far.
    pub fn clusters(&self) -> &[ClusterRecord] {
        &self.clusters
    }

    pub fn finish(self) -> Vec<ClusterRecord> {
        for rec in &self.clusters {
            if rec.observed_points != rec.npoints {
                warn!(
                    "[parser] cluster {} declares {} points but {} distance lines were read",
                    rec.label, rec.npoints, rec.observed_points
                );
            }
        }
        debug!(
            "[parser] finished: {} clusters from {} lines",
            self.clusters.len(),
            self.line_number
        );
        self.clusters
    }

    fn open_cluster(&mut self, line: &str) -> EvalResult<()> {
        let header = parse_header(line)
            .map_err(|reason| EvalError::malformed(self.line_number, line, reason))?;

        if !self.labels.insert(header.label.clone()) {
            return Err(EvalError::malformed(
                self.line_number,
                line,
                format!("duplicate cluster identifier '{}'", header.label),
            ));
        }

        self.declared_points = self
            .declared_points
            .checked_add(header.npoints)
            .ok_or_else(|| {
                EvalError::malformed(
                    self.line_number,
                    line,
                    "total point count of the dump overflows a 64-bit integer",
                )
            })?;

        debug!(
            "[parser] cluster {} at line {}: {} terms, {} points",
            header.label,
            self.line_number,
            header.centroid.len(),
            header.npoints
        );

        self.clusters.push(ClusterRecord::new(
            header.label,
            header.centroid,
            header.npoints,
        ));
        self.state = ParserState::WithinCluster(self.clusters.len() - 1);
        Ok(())
    }

    fn record_point(&mut self, line: &str) -> EvalResult<()> {
        let index = match self.state {
            ParserState::WithinCluster(index) => index,
            ParserState::AwaitingCluster => {
                return Err(EvalError::NoActiveCluster {
                    line: self.line_number,
                    content: line.trim_end().to_string(),
                });
            }
        };

        let raw = parse_point_distance(line)
            .map_err(|reason| EvalError::malformed(self.line_number, line, reason))?;
        let contribution = self.measure.squared_contribution(raw);
        trace!("[parser] line {}: distance {raw} -> {contribution}", self.line_number);

        if let Some(rec) = self.clusters.get_mut(index) {
            rec.observe(contribution);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    const TWO_CLUSTERS: &str = r#"[
{"identifier":"VL-0","r":[{"apple":0.1}],"c":[{"apple":1.0},{"pear":0.5}],"n":2}
	Weight : [props - optional]:  Point:
	1.0: [distance=0.5]: /doc/1 = [apple:1.0]
	1.0: [distance=0.25]: /doc/2 = [pear:1.0]
{"identifier":"VL-1","r":[{"plum":0.2}],"c":[{"plum":2.0}],"n":2}
	1.0: [distance=0.1]: /doc/3 = [plum:2.0]
	1.0: [distance=0.3]: /doc/4 = [plum:1.5]
]
"#;

    #[test]
    fn test_parse_header_fields() {
        let line = r#"{"identifier":"VL-17","r":[{"x":0.1}],"c":[{"x":1.5},{"y":2.0}],"n":42}"#;
        let header = parse_header(line).unwrap();
        assert_eq!(header.label, "VL-17");
        assert_eq!(header.npoints, 42);
        assert_eq!(header.centroid.get("x"), 1.5);
        assert_eq!(header.centroid.get("y"), 2.0);
    }

    #[test]
    fn test_parse_header_missing_count() {
        let err = parse_header(r#"{"identifier":"VL-1","r":[],"c":[{"x":1.0}]}"#).unwrap_err();
        assert!(err.contains("missing point count"), "{err}");
    }

    #[test]
    fn test_parse_header_bad_count() {
        let err =
            parse_header(r#"{"identifier":"VL-1","r":[],"c":[{"x":1.0}],"n":-3}"#).unwrap_err();
        assert!(err.contains("non-negative integer"), "{err}");
    }

    #[test]
    fn test_parse_header_missing_centroid() {
        let err = parse_header(r#"{"identifier":"VL-1","n":3}"#).unwrap_err();
        assert!(err.contains("missing centroid"), "{err}");
    }

    #[test]
    fn test_parse_point_distance() {
        assert_eq!(parse_point_distance("1.0: [distance=0.125]: /x").unwrap(), 0.125);
        assert_eq!(parse_point_distance("[distance= 2 ]").unwrap(), 2.0);
        assert!(parse_point_distance("[distance=abc]").is_err());
        assert!(parse_point_distance("[distance=NaN]").is_err());
        assert!(parse_point_distance("[distance=0.5").is_err());
    }

    #[test]
    fn test_two_clusters_cosine() {
        let clusters = DumpParser::parse_str(TWO_CLUSTERS, DistanceMeasure::Cosine).unwrap();
        assert_eq!(clusters.len(), 2);

        let a = &clusters[0];
        assert_eq!(a.label, "VL-0");
        assert_eq!(a.npoints, 2);
        assert_eq!(a.observed_points, 2);
        assert_eq!(a.centroid.get("apple"), 1.0);
        assert_eq!(a.centroid.get("pear"), 0.5);
        assert!((a.sse - (0.25 + 0.0625)).abs() < EPS);
        assert_eq!(a.min_distance(), Some(0.0625));
        assert_eq!(a.max_distance(), Some(0.25));

        let b = &clusters[1];
        assert_eq!(b.label, "VL-1");
        assert_eq!(b.centroid.get("plum"), 2.0);
        assert!((b.sse - (0.01 + 0.09)).abs() < EPS);
        assert!((b.min - 0.01).abs() < EPS);
        assert!((b.max - 0.09).abs() < EPS);
    }

    #[test]
    fn test_two_clusters_squared_euclidean_not_squared_again() {
        let clusters =
            DumpParser::parse_str(TWO_CLUSTERS, DistanceMeasure::SquaredEuclidean).unwrap();
        assert!((clusters[0].sse - 0.75).abs() < EPS);
        assert!((clusters[1].sse - 0.4).abs() < EPS);
        assert_eq!(clusters[0].min_distance(), Some(0.25));
    }

    #[test]
    fn test_point_before_header() {
        let text = "[\n\t1.0: [distance=0.5]: /doc/1\n";
        match DumpParser::parse_str(text, DistanceMeasure::Cosine) {
            Err(EvalError::NoActiveCluster { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected NoActiveCluster, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_distance_reports_line() {
        let text = concat!(
            r#"{"identifier":"VL-0","r":[],"c":[{"a":1.0}],"n":1}"#,
            "\n\t1.0: [distance=oops]: /doc/1\n"
        );
        match DumpParser::parse_str(text, DistanceMeasure::Cosine) {
            Err(EvalError::MalformedDump { line, content, .. }) => {
                assert_eq!(line, 2);
                assert!(content.contains("distance=oops"));
            }
            other => panic!("expected MalformedDump, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_point_total_overflow_is_malformed() {
        let text = concat!(
            r#"{"identifier":"A","r":[],"c":[{"a":1.0}],"n":18446744073709551615}"#,
            "\n",
            r#"{"identifier":"B","r":[],"c":[{"a":2.0}],"n":2}"#,
            "\n"
        );
        match DumpParser::parse_str(text, DistanceMeasure::SquaredEuclidean) {
            Err(EvalError::MalformedDump { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("overflows"), "{reason}");
            }
            other => panic!("expected MalformedDump, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_in_point_path_is_ignored() {
        let mut bytes = br#"{"identifier":"VL-0","r":[],"c":[{"a":1.0}],"n":1}"#.to_vec();
        bytes.extend_from_slice(b"\r\n\t1.0: [distance=0.5]: /doc/caf\xe9\r\n");

        let clusters = DumpParser::parse(bytes.as_slice(), DistanceMeasure::Cosine).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].observed_points, 1);
        assert!((clusters[0].sse - 0.25).abs() < EPS);
    }

    #[test]
    fn test_invalid_utf8_in_header_is_malformed() {
        let bytes = b"x\n{\"identifier\":\"VL-\xff\",\"r\":[],\"c\":[{\"a\":1.0}],\"n\":1}\n";
        assert!(matches!(
            DumpParser::parse(&bytes[..], DistanceMeasure::Cosine),
            Err(EvalError::MalformedDump { line: 2, .. })
        ));
    }

    #[test]
    fn test_dump_lines_strip_line_endings() {
        let lines: Vec<_> = DumpLines::new(&b"one\r\ntwo\nthree"[..])
            .map(|line| line.unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                (1, "one".to_string()),
                (2, "two".to_string()),
                (3, "three".to_string())
            ]
        );
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let header = "{\"identifier\":\"VL-0\",\"r\":[],\"c\":[{\"a\":1.0}],\"n\":1}\n";
        let text = format!("{header}{header}");
        assert!(matches!(
            DumpParser::parse_str(&text, DistanceMeasure::Cosine),
            Err(EvalError::MalformedDump { line: 2, .. })
        ));
    }

    #[test]
    fn test_unrelated_lines_ignored() {
        let clusters =
            DumpParser::parse_str("[\n\n]\nsome text\n", DistanceMeasure::Cosine).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_feed_line_incrementally() {
        let mut parser = DumpParser::new(DistanceMeasure::SquaredEuclidean);
        parser
            .feed_line(r#"{"identifier":"CL-9","r":[],"c":[{"a":1.0}],"n":1}"#)
            .unwrap();
        assert_eq!(parser.clusters().len(), 1);
        parser.feed_line("  1.0 : [distance=4.0]").unwrap();
        let clusters = parser.finish();
        assert_eq!(clusters[0].sse, 4.0);
    }
}
