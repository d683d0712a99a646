//! Thin CSV-in/CSV-out wrapper around the remediation pipeline.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::*;
use tracing::info;

use datamend_processing::{Pipeline, PipelineConfig, ReportGenerator};

#[derive(Parser, Debug)]
#[command(
    name = "datamend",
    about = "Batch data-quality remediation for tabular customer records",
    version
)]
struct Args {
    /// Input CSV file
    input: PathBuf,

    /// Output path for the cleaned CSV
    #[arg(short, long, default_value = "cleaned.csv")]
    output: PathBuf,

    /// Output path for the JSON quality report (baseline and final)
    #[arg(long, default_value = "quality_report.json")]
    report: PathBuf,

    /// Output path for the JSON correction log
    #[arg(long, default_value = "corrections.json")]
    log: PathBuf,

    /// Optional pipeline configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress the text report on stdout
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config file {}", path.display()))?;
            serde_json::from_reader::<_, PipelineConfig>(file)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(args.input.clone()))
        .with_context(|| format!("failed to open input CSV {}", args.input.display()))?
        .finish()
        .context("failed to read input CSV")?;

    info!(
        rows = df.height(),
        columns = df.width(),
        input = %args.input.display(),
        "loaded dataset"
    );

    let result = Pipeline::builder().config(config).build()?.process(df)?;

    let mut cleaned = result.cleaned.clone();
    let output_file = File::create(&args.output)
        .with_context(|| format!("failed to create output file {}", args.output.display()))?;
    CsvWriter::new(output_file)
        .finish(&mut cleaned)
        .context("failed to write cleaned CSV")?;

    let report_file = File::create(&args.report)
        .with_context(|| format!("failed to create report file {}", args.report.display()))?;
    serde_json::to_writer_pretty(
        report_file,
        &serde_json::json!({
            "baseline": result.baseline_report,
            "final": result.final_report,
            "summary": result.summary,
        }),
    )
    .context("failed to write quality report")?;

    let log_file = File::create(&args.log)
        .with_context(|| format!("failed to create log file {}", args.log.display()))?;
    serde_json::to_writer_pretty(log_file, &result.correction_log)
        .context("failed to write correction log")?;

    if !args.quiet {
        println!("{}", ReportGenerator::render(&result));
    }

    info!(
        output = %args.output.display(),
        corrections = result.correction_log.len(),
        improvement = result.improvement(),
        "remediation complete"
    );

    Ok(())
}
