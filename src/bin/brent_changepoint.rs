//! Command-line runner for a change-point analysis.
//!
//! ```text
//! brent_changepoint --prices data/BrentOilPrices.csv --events data/events.csv \
//!     --config analysis.toml --format json --output result.json
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level chosen by `-v`.
use anyhow::{Context, Result};
use brent_changepoint::{
    events::EventCalendar,
    optimization::mode_finder::LineSearcher,
    pipeline::{
        AnalysisOptions, AnalysisOutcome, ReportMode, analyze, load_event_calendar,
        load_price_series,
    },
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Flat impact record plus diagnostics, pretty-printed.
    Json,
    /// One CSV row with the flat impact record.
    Csv,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect a single change point in daily price log-returns")]
struct Args {
    /// Price CSV with `Date` and `Price` columns
    #[arg(short, long)]
    prices: PathBuf,

    /// Event CSV with `Date` and `Event` columns; missing files are skipped
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// TOML file with analysis options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the sampler seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override retained draws per chain
    #[arg(long)]
    draws: Option<usize>,

    /// Override warm-up iterations per chain
    #[arg(long)]
    tune: Option<usize>,

    /// Override the number of chains
    #[arg(long)]
    chains: Option<usize>,

    /// Line search of the L-BFGS chain initialization (more-thuente, hager-zhang)
    #[arg(long)]
    line_search: Option<LineSearcher>,

    /// L-BFGS history size for chain initialization
    #[arg(long)]
    lbfgs_mem: Option<usize>,

    /// Inclusive window start (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Inclusive window end (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Report the credible interval dates in the flat record
    #[arg(long)]
    range: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug with mode-finder traces)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn build_options(args: &Args) -> Result<AnalysisOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AnalysisOptions::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AnalysisOptions::default(),
    };
    if let Some(seed) = args.seed {
        opts.sampler.seed = seed;
    }
    if let Some(draws) = args.draws {
        opts.sampler.draws = draws;
    }
    if let Some(tune) = args.tune {
        opts.sampler.tune = tune;
    }
    if let Some(chains) = args.chains {
        opts.sampler.chains = chains;
    }
    if let Some(line_searcher) = args.line_search {
        opts.sampler.mode.line_searcher = line_searcher;
    }
    if args.lbfgs_mem.is_some() {
        opts.sampler.mode.lbfgs_mem = args.lbfgs_mem;
    }
    if args.verbose >= 2 {
        opts.sampler.mode.verbose = true;
    }
    if args.start.is_some() {
        opts.start = args.start;
    }
    if args.end.is_some() {
        opts.end = args.end;
    }
    if args.range {
        opts.report = ReportMode::Range;
    }
    opts.validate()?;
    Ok(opts)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    record: &'a brent_changepoint::pipeline::ImpactRecord,
    tau: usize,
    tau_interval: (usize, usize),
    sigma_mean: f64,
    diagnostics: &'a brent_changepoint::summary::Diagnostics,
    stats: &'a brent_changepoint::pipeline::WindowStats,
}

fn render(outcome: &AnalysisOutcome, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                record: &outcome.record,
                tau: outcome.impact.tau,
                tau_interval: (outcome.impact.tau_low, outcome.impact.tau_high),
                sigma_mean: outcome.impact.sigma_mean,
                diagnostics: &outcome.summary.diagnostics,
                stats: &outcome.stats,
            };
            let mut bytes = serde_json::to_vec_pretty(&report)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.serialize(&outcome.record)?;
            writer.into_inner().context("flushing CSV output")
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let opts = build_options(&args)?;
    let prices = load_price_series(&args.prices)?;
    let events = match &args.events {
        Some(path) => load_event_calendar(path)?,
        None => EventCalendar::default(),
    };

    let outcome = analyze(&prices, &events, &opts)?;
    if let Some(r_hat) = outcome.summary.diagnostics.max_r_hat() {
        if r_hat > 1.01 {
            tracing::warn!(r_hat, "chains may not have converged");
        }
    }

    let bytes = render(&outcome, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => io::stdout().write_all(&bytes).context("writing to stdout")?,
    }
    Ok(())
}
