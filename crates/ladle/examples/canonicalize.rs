//! Minimal library usage: load a reference snapshot, canonicalize a file.
//!
//! ```bash
//! cargo run --example canonicalize -- reference/ stage1.jsonl
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use ladle::{batch, Pipeline, ReferenceSnapshot};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let reference = args.next().expect("usage: canonicalize <reference-dir> <input.jsonl>");
    let input = args.next().expect("usage: canonicalize <reference-dir> <input.jsonl>");

    let snapshot = Arc::new(ReferenceSnapshot::load(reference)?);
    let pipeline = Pipeline::new(snapshot);

    let reader = BufReader::new(File::open(input)?);
    let mut stdout = io::stdout().lock();
    let summary = batch::process_stream(&pipeline, reader, &mut stdout)?;

    eprintln!(
        "{} rows: {} converted, {} unconverted, {} rejected",
        summary.total_lines, summary.converted, summary.unconverted, summary.rejected
    );
    Ok(())
}
