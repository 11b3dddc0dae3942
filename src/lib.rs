//! Streaming predicate filter for newline-delimited JSON (JSONL) datasets.
//!
//! Reads one JSON object per line, tests each against a composable
//! predicate, and keeps only the matches — the unfiltered file is never
//! held in memory, which is the point when the dataset is a few GB of
//! business or review records.
//!
//! Architecture:
//! ```text
//!  businesses.jsonl
//!        │  one line at a time
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  decode line → Record, test, collect matches
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ predicate │  Equals / Substring / WithinRadius / Any / All …
//!   └───────────┘
//!        │
//!        ▼
//!   Vec<Record>  (source order, matches only)
//! ```
//!
//! ```no_run
//! use jsonl_sieve::{load_matches, GeoPoint, LoadOptions, Predicate};
//!
//! # fn main() -> anyhow::Result<()> {
//! let philly = GeoPoint::new(39.9526, -75.1652);
//! let nearby_and_open = Predicate::All(vec![
//!     Predicate::within_radius(philly, 2.0),
//!     Predicate::equals("is_open", 1),
//! ]);
//! let records = load_matches(
//!     "businesses.jsonl".as_ref(),
//!     &nearby_and_open,
//!     &LoadOptions { verbose: true, ..Default::default() },
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod geo;
pub mod loader;
pub mod model;
pub mod predicate;

pub use geo::{haversine_miles, GeoPoint};
pub use loader::{load_matches, scan_matches, LoadOptions, ScanStats};
pub use model::Record;
pub use predicate::{EvalError, Predicate};
