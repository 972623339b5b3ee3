use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::Parser;
use log::{info, warn};
use nicu_episodes::utils::dates::parse_claim_date;
use nicu_episodes::utils::io::{read_claims, write_json, write_records};
use nicu_episodes::{NicuPipeline, PipelineConfig, ReferenceIndex, StudyWindow};
use std::path::PathBuf;
use std::time::Instant;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[derive(Parser)]
#[command(name = "nicu-episodes")]
#[command(about = "Stitch newborn and NICU episodes from claims and summarize them by cohort")]
struct Cli {
    /// Claims parquet file
    claims: PathBuf,

    /// Reference code tables (JSON)
    reference: PathBuf,

    /// Directory for the parquet and JSON outputs
    output_dir: PathBuf,

    /// Study midpoint; derived from the claims when omitted
    #[arg(long, requires = "run_out_end", value_parser = parse_date)]
    midpoint: Option<NaiveDate>,

    /// Last date of claims run-out
    #[arg(long, requires = "midpoint", value_parser = parse_date)]
    run_out_end: Option<NaiveDate>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_claim_date(value).ok_or_else(|| format!("`{value}` is not a recognized date"))
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let claims_path = cli.claims.as_path();
    let reference_path = cli.reference.as_path();
    let output_dir = cli.output_dir;

    let start = Instant::now();
    let reference = ReferenceIndex::from_json_file(reference_path)
        .with_context(|| format!("loading reference tables from {}", reference_path.display()))?;
    let claims = read_claims(claims_path)
        .with_context(|| format!("reading claims from {}", claims_path.display()))?;

    let mut window = None;
    let config = if let (Some(midpoint), Some(run_out_end)) = (cli.midpoint, cli.run_out_end) {
        PipelineConfig::new(midpoint, run_out_end)
    } else {
        let first = claims.iter().map(|c| c.service_from).min();
        let last = claims.iter().map(|c| c.service_from).max();
        let (Some(first), Some(last)) = (first, last) else {
            bail!("claims file {} is empty", claims_path.display());
        };
        let derived = StudyWindow::from_service_dates(first, last)?;
        info!("Derived study window: {derived}");
        window = Some(derived);
        PipelineConfig::from_window(&derived)
    };
    let config = config.with_progress(true);
    info!("{config}");

    let output = NicuPipeline::new().run(claims, &reference, &config)?;
    if let Some(window) = window {
        let outside = output
            .newborns
            .iter()
            .filter(|n| !window.contains(&n.delivery_date))
            .count();
        if outside > 0 {
            warn!("{outside} newborns were delivered outside the birth window");
        }
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    write_records(&output_dir.join("newborns.parquet"), &output.newborns)?;
    write_records(&output_dir.join("nicu_episodes.parquet"), &output.nicu_episodes)?;
    write_records(&output_dir.join("cohort_summary.parquet"), &output.cohort_summaries)?;
    write_records(&output_dir.join("readmission_links.parquet"), &output.readmission_links)?;
    write_records(&output_dir.join("rejected_episodes.parquet"), &output.rejected_episodes)?;
    write_json(&output_dir.join("cohort_summary.json"), &output.cohort_summaries)?;

    info!("Finished in {:?}", start.elapsed());
    Ok(())
}
