use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Record;
use crate::predicate::Predicate;

// ---------------------------------------------------------------------------
// Options and counters
// ---------------------------------------------------------------------------

/// Knobs for one load call.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Stop before processing this many lines. `None` scans the whole file.
    pub max_lines: Option<usize>,
    /// Print a progress stream and a summary to stdout.
    pub verbose: bool,
}

/// Counters from one scan, mirroring the verbose summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Records that matched the predicate.
    pub matched: usize,
    /// Index of the last line examined, zero-based. For a full-file scan of
    /// a non-empty file this is one less than the number of lines read;
    /// when a `max_lines` cutoff fires it equals the number of lines
    /// processed. Kept as-is so summaries line up with the historical
    /// output, rather than normalised to a line count.
    pub last_index: usize,
    /// Well-formed records the predicate faulted on; excluded from the
    /// result but never fatal.
    pub unprocessable: usize,
}

// ---------------------------------------------------------------------------
// Progress ticks
// ---------------------------------------------------------------------------

/// Cadence of the verbose progress stream: one `*` per 100 000 lines for
/// unbounded scans, one `=` per 5% of the configured maximum otherwise.
struct Progress {
    stride: usize,
    glyph: char,
}

impl Progress {
    fn new(max_lines: Option<usize>) -> Self {
        match max_lines {
            None => Progress {
                stride: 100_000,
                glyph: '*',
            },
            // max(1) keeps small maxima from a zero stride
            Some(n) => Progress {
                stride: (n / 20).max(1),
                glyph: '=',
            },
        }
    }

    fn is_tick(&self, index: usize) -> bool {
        index % self.stride == 0
    }
}

// ---------------------------------------------------------------------------
// Streaming scan
// ---------------------------------------------------------------------------

/// Stream a JSONL file and collect the records matching `predicate`.
///
/// Lines are decoded and tested one at a time, so memory stays
/// proportional to the matches rather than the file. Two failure tiers
/// apply:
///
/// * A line that is not valid UTF-8 or not a valid JSON object aborts the
///   whole call with an error — malformed framing is never skipped.
/// * A predicate fault on a well-formed record (missing field, wrong
///   type) excludes that record, bumps a counter, and the scan continues.
///
/// Matches keep their source-line order. Pass [`Predicate::Always`] (the
/// default) to load every record.
pub fn load_matches(path: &Path, predicate: &Predicate, options: &LoadOptions) -> Result<Vec<Record>> {
    let (records, _) = scan_matches(path, predicate, options)?;
    Ok(records)
}

/// Same scan as [`load_matches`], also returning the summary counters.
pub fn scan_matches(
    path: &Path,
    predicate: &Predicate,
    options: &LoadOptions,
) -> Result<(Vec<Record>, ScanStats)> {
    let file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    log::debug!("scanning {}", path.display());

    let progress = Progress::new(options.max_lines);
    if options.verbose {
        println!("Now loading {}", path.display());
        print!("[");
        io::stdout().flush().ok();
    }

    let mut data: Vec<Record> = Vec::new();
    let mut unprocessable = 0usize;
    let mut last_index = 0usize;

    for (i, line) in reader.lines().enumerate() {
        last_index = i;
        if Some(i) == options.max_lines {
            break;
        }

        // Fatal tier: undecodable bytes or unparseable JSON abort the load.
        let line = line.with_context(|| format!("reading line {i} of {}", path.display()))?;
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("line {i} of {} is not a JSON object", path.display()))?;

        // Recoverable tier: predicate faults are isolated per line.
        match predicate.eval(&record) {
            Ok(true) => data.push(record),
            Ok(false) => {}
            Err(err) => {
                log::debug!("line {i}: record unprocessable: {err}");
                unprocessable += 1;
            }
        }

        if options.verbose && progress.is_tick(i) {
            print!("{}", progress.glyph);
            io::stdout().flush().ok();
        }
    }

    if options.verbose {
        println!(
            "] Loaded {}/{} entries ({} unprocessable)",
            data.len(),
            last_index,
            unprocessable
        );
    }
    log::debug!(
        "scan of {} done: {} matched, {} unprocessable",
        path.display(),
        data.len(),
        unprocessable
    );

    let stats = ScanStats {
        matched: data.len(),
        last_index,
        unprocessable,
    };
    Ok((data, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use serde_json::json;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn jsonl_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn businesses() -> NamedTempFile {
        jsonl_file(&[
            r#"{"name": "Blue Fish Grill", "state": "CA", "stars": 4.5, "is_open": 1}"#,
            r#"{"name": "Aquarium Supplies", "state": "PA", "stars": 3.0, "is_open": 1}"#,
            r#"{"name": "Desert Diner", "state": "CA", "stars": 4.0, "is_open": 0}"#,
            r#"{"name": "Catfish Corner", "state": "NV", "stars": 2.5, "is_open": 1}"#,
        ])
    }

    #[test]
    fn default_predicate_loads_everything_in_order() {
        let file = businesses();
        let records =
            load_matches(file.path(), &Predicate::default(), &LoadOptions::default()).unwrap();
        assert_eq!(records.len(), 4);
        let names: Vec<&str> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            ["Blue Fish Grill", "Aquarium Supplies", "Desert Diner", "Catfish Corner"]
        );
    }

    #[test]
    fn never_matches_nothing() {
        let file = businesses();
        let records =
            load_matches(file.path(), &Predicate::Never, &LoadOptions::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn equality_filter_selects_the_matching_subset() {
        let file = businesses();
        let records = load_matches(
            file.path(),
            &Predicate::equals("state", "CA"),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], json!("Blue Fish Grill"));
        assert_eq!(records[1]["name"], json!("Desert Diner"));
    }

    #[test]
    fn substring_filter_is_case_insensitive() {
        let file = businesses();
        let records = load_matches(
            file.path(),
            &Predicate::substring("name", "Fish"),
            &LoadOptions::default(),
        )
        .unwrap();
        let names: Vec<&str> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Blue Fish Grill", "Catfish Corner"]);
    }

    #[test]
    fn combined_conditions_via_all() {
        let file = businesses();
        let open_and_good = Predicate::All(vec![
            Predicate::greater_than("stars", 3.9),
            Predicate::equals("is_open", 1),
        ]);
        let records =
            load_matches(file.path(), &open_and_good, &LoadOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], json!("Blue Fish Grill"));
    }

    #[test]
    fn geo_filter_streams_through_the_loader() {
        let file = jsonl_file(&[
            r#"{"name": "near", "latitude": 39.95, "longitude": -75.16}"#,
            r#"{"name": "far", "latitude": 40.67, "longitude": -75.16}"#,
        ]);
        let philly = GeoPoint::new(39.9526, -75.1652);
        let records = load_matches(
            file.path(),
            &Predicate::within_radius(philly, 2.0),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], json!("near"));
    }

    #[test]
    fn max_lines_zero_scans_nothing() {
        let file = businesses();
        let options = LoadOptions {
            max_lines: Some(0),
            ..Default::default()
        };
        let (records, stats) =
            scan_matches(file.path(), &Predicate::default(), &options).unwrap();
        assert!(records.is_empty());
        assert_eq!(stats.last_index, 0);
        assert_eq!(stats.unprocessable, 0);
    }

    #[test]
    fn max_lines_cuts_off_mid_file() {
        let file = businesses();
        let options = LoadOptions {
            max_lines: Some(2),
            ..Default::default()
        };
        let (records, stats) =
            scan_matches(file.path(), &Predicate::default(), &options).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], json!("Aquarium Supplies"));
        // the cutoff line is the last one examined
        assert_eq!(stats.last_index, 2);
    }

    #[test]
    fn full_scan_reports_the_last_line_index() {
        let file = businesses();
        let (_, stats) =
            scan_matches(file.path(), &Predicate::default(), &LoadOptions::default()).unwrap();
        // four lines, zero-based index of the last one
        assert_eq!(stats.last_index, 3);
        assert_eq!(stats.matched, 4);
    }

    #[test]
    fn empty_file_yields_nothing() {
        let file = jsonl_file(&[]);
        let (records, stats) =
            scan_matches(file.path(), &Predicate::default(), &LoadOptions::default()).unwrap();
        assert!(records.is_empty());
        assert_eq!(stats.last_index, 0);
    }

    #[test]
    fn predicate_faults_are_counted_not_fatal() {
        let file = jsonl_file(&[
            r#"{"state": "CA", "stars": 4.5}"#,
            r#"{"stars": 3.0}"#,
            r#"{"state": "CA", "stars": 2.0}"#,
        ]);
        let (records, stats) = scan_matches(
            file.path(),
            &Predicate::equals("state", "CA"),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(stats.unprocessable, 1);
    }

    #[test]
    fn malformed_line_aborts_wherever_it_sits() {
        let file = jsonl_file(&[
            r#"{"state": "CA"}"#,
            r#"{"state":"#,
            r#"{"state": "NV"}"#,
        ]);
        let err = load_matches(file.path(), &Predicate::default(), &LoadOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn non_object_line_is_a_framing_error() {
        let file = jsonl_file(&[r#"{"ok": true}"#, "42"]);
        assert!(
            load_matches(file.path(), &Predicate::default(), &LoadOptions::default()).is_err()
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("/definitely/not/here.jsonl");
        assert!(
            load_matches(path, &Predicate::default(), &LoadOptions::default()).is_err()
        );
    }

    #[test]
    fn progress_stride_for_unbounded_scans() {
        let p = Progress::new(None);
        assert_eq!(p.stride, 100_000);
        assert_eq!(p.glyph, '*');
        assert!(p.is_tick(0));
        assert!(p.is_tick(200_000));
        assert!(!p.is_tick(150_000));
    }

    #[test]
    fn progress_stride_is_five_percent_of_the_maximum() {
        let p = Progress::new(Some(1000));
        assert_eq!(p.stride, 50);
        assert_eq!(p.glyph, '=');
        assert!(p.is_tick(100));
        assert!(!p.is_tick(101));
    }

    #[test]
    fn progress_stride_never_reaches_zero() {
        // maxima below 20 would otherwise divide to zero
        let p = Progress::new(Some(5));
        assert_eq!(p.stride, 1);
        assert!(p.is_tick(3));
    }
}
