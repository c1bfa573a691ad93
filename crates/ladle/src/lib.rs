//! ladle: deterministic canonicalization of recipe ingredient lines.
//!
//! ladle takes loosely-structured ingredient rows (`"1/2 cup chia seeds"`)
//! and produces a canonical record carrying a machine-usable quantity in
//! grams, millilitres, or count, a linked ingredient identity, a resolved
//! physical form, and a full audit trail of how each decision was reached.
//!
//! # Core Principles
//!
//! - **Deterministic**: every tie-break is a total order over stable fields;
//!   re-running the same input against the same reference snapshot yields
//!   identical records.
//! - **Non-destructive**: no stage rewrites a field written by an earlier
//!   stage, and original input text is always preserved.
//! - **Failures are data**: an unmatched ingredient or a missing density is
//!   a classified code on the record, never a process error.
//! - **Rigid unit algebra**: counts never convert, containers never become
//!   contents, and mass↔volume crossings happen only through a density.
//!
//! # Basic Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ladle::{Pipeline, ReferenceSnapshot};
//!
//! let snapshot = Arc::new(ReferenceSnapshot::load("reference/").unwrap());
//! let pipeline = Pipeline::new(snapshot);
//!
//! let input = std::io::BufReader::new(std::fs::File::open("stage1.jsonl").unwrap());
//! let mut output = Vec::new();
//! let summary = ladle::batch::process_stream(&pipeline, input, &mut output).unwrap();
//!
//! println!("converted {}/{} rows", summary.converted, summary.accepted);
//! ```

pub mod batch;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod reference;
pub mod report;

pub use batch::{process_stream, BatchSummary};
pub use error::{LadleError, Result};
pub use pipeline::{IntakeOutcome, Pipeline, PipelineConfig, Rejection};
pub use record::{CanonicalRecord, CleanRow, RawRow};
pub use reference::ReferenceSnapshot;
