use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use repsample::report::{JsonSink, ReportSink, SummarySink};
use repsample::{
    DatasetCatalog, PairDatasetScanner, ProbeConfig, SaturationPolicy, SingleDatasetScanner,
};

#[derive(Parser, Debug)]
#[command(name = "repsample")]
#[command(version)]
#[command(about = "Find the smallest representative sample fraction of numeric datasets", long_about = None)]
struct Cli {
    /// JSON configuration file (every key optional)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for reproducible sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Also write JSON reports into this directory
    #[arg(short, long, global = true, value_name = "DIR")]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan every dataset in a directory for its representative fraction
    Single {
        /// Directory with .csv / .parquet / .json files
        #[arg(short, long, default_value = "./data")]
        dir: PathBuf,
    },
    /// Test whether two datasets share a distribution
    Pair {
        /// Directory holding both datasets
        #[arg(short, long, default_value = "./data")]
        dir: PathBuf,

        /// First dataset file name
        first: String,

        /// Second dataset file name
        second: String,

        /// Number of resampling trials
        #[arg(short, long)]
        trials: Option<usize>,

        /// Which saturated columns to leave out of each trial
        #[arg(long, value_enum)]
        saturation: Option<SaturationPolicy>,
    },
}

fn load_config(cli: &Cli) -> Result<ProbeConfig> {
    let mut config = match &cli.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Command::Pair {
        trials, saturation, ..
    } = &cli.command
    {
        if let Some(trials) = trials {
            config.trials = *trials;
        }
        if let Some(policy) = saturation {
            config.saturation = *policy;
        }
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn sinks(out: Option<&Path>) -> Result<Vec<Box<dyn ReportSink>>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(SummarySink::new(std::io::stdout()))];
    if let Some(dir) = out {
        sinks.push(Box::new(JsonSink::new(dir)?));
    }
    Ok(sinks)
}

fn run_single(config: &ProbeConfig, dir: &Path, out: Option<&Path>) -> Result<()> {
    let catalog = DatasetCatalog::load_dir(dir)?;
    if catalog.is_empty() {
        bail!("no datasets found in {}", dir.display());
    }
    let scanner = SingleDatasetScanner::from_config(config);
    let mut sinks = sinks(out)?;

    let mut failures = 0;
    for (id, dataset) in catalog.iter() {
        match scanner.report(id, dataset) {
            Ok(report) => {
                for sink in &mut sinks {
                    sink.single(id, &report)?;
                }
            }
            Err(e) => {
                error!("{id}: {} ({e})", e.kind());
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{failures} of {} datasets could not be scanned", catalog.len());
    }
    Ok(())
}

fn run_pair(
    config: &ProbeConfig,
    dir: &Path,
    first: &str,
    second: &str,
    out: Option<&Path>,
) -> Result<()> {
    let mut catalog = DatasetCatalog::default();
    for id in [first, second] {
        let dataset = repsample::load_file(&dir.join(id))
            .with_context(|| format!("loading dataset '{id}'"))?;
        catalog.insert(id, dataset);
    }

    let label = format!("{first}__{second}");
    let report = PairDatasetScanner::from_config(config)
        .scan_pair(catalog.require(first)?, catalog.require(second)?, config.trials)
        .with_context(|| format!("comparing '{first}' with '{second}'"))?;
    info!("{label}: {} trials done", report.trials.len());

    for sink in &mut sinks(out)? {
        sink.pair(&label, &report)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let out = cli.out.as_deref();

    match &cli.command {
        Command::Single { dir } => run_single(&config, dir, out),
        Command::Pair {
            dir, first, second, ..
        } => run_pair(&config, dir, first, second, out),
    }
}
