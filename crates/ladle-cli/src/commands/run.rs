//! Run command - process a Stage-1 file and write canonical records.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use ladle::{batch, report, Pipeline, PipelineConfig, ReferenceSnapshot};

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: PathBuf,
    reference: PathBuf,
    output: Option<PathBuf>,
    errors: Option<PathBuf>,
    report_path: Option<PathBuf>,
    today: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !reference.is_dir() {
        return Err(format!("Reference directory not found: {}", reference.display()).into());
    }

    let mut config = PipelineConfig::default();
    if let Some(date) = today {
        config.today = date
            .parse()
            .map_err(|_| format!("--today must be YYYY-MM-DD, got '{date}'"))?;
    }

    println!(
        "{} {}",
        "Loading reference snapshot from".cyan().bold(),
        reference.display().to_string().white()
    );
    let snapshot = Arc::new(ReferenceSnapshot::load(&reference)?);
    if verbose {
        println!(
            "  {} ingredients, {} forms, {} densities",
            snapshot.ingredient_count(),
            snapshot.form_count(),
            snapshot.density_count()
        );
    }

    let pipeline = Pipeline::with_config(snapshot, config);

    let output_path = output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{stem}.canonical.jsonl"))
    });

    println!(
        "{} {}",
        "Processing".cyan().bold(),
        input.display().to_string().white()
    );
    let reader = BufReader::new(File::open(&input)?);
    let mut writer = BufWriter::new(File::create(&output_path)?);
    let summary = batch::process_stream(&pipeline, reader, &mut writer)?;
    writer.flush()?;

    println!(
        "Processed {} rows: {} converted, {} unconverted, {} rejected, {} duplicates",
        summary.total_lines.to_string().white().bold(),
        summary.converted.to_string().green(),
        summary.unconverted.to_string().yellow(),
        summary.rejected.to_string().red(),
        summary.duplicates_skipped
    );
    println!(
        "{} {}",
        "Wrote".green().bold(),
        output_path.display().to_string().white()
    );

    if let Some(path) = errors {
        let mut writer = BufWriter::new(File::create(&path)?);
        report::write_machine_report(&summary, &mut writer)?;
        println!("{} {}", "Error report".green().bold(), path.display());
    }
    if let Some(path) = report_path {
        let mut writer = BufWriter::new(File::create(&path)?);
        report::write_human_report(&summary, &mut writer)?;
        println!("{} {}", "Summary report".green().bold(), path.display());
    }

    if !summary.failures.is_empty() && verbose {
        println!();
        for failure in summary.failures.iter().take(10) {
            println!(
                "  {} {} line {}: \"{}\"",
                failure.code.yellow(),
                failure.recipe_id,
                failure.ingredient_line_number,
                failure.ingredient_original_text
            );
        }
    }

    // Row-level failures are data, not process failures.
    Ok(())
}
