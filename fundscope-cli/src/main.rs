//! FundScope CLI: fetch, score, and rank investment funds.
//!
//! Commands:
//! - `init-config`: write the default TOML config
//! - `fetch`: run the pipeline and save the ranked table
//! - `offerings`: query the secondary listing only
//! - `filter`: apply the chart view filter to a saved table

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fundscope_core::data::{collect_offerings, OfferingsProvider, StdoutProgress};
use fundscope_core::domain::Horizon;
use fundscope_runner::{
    chart_points, export_chart_csv, load_records_csv, run_from_config, save_artifacts,
    ChartBounds, PipelineConfig, PipelineReport, StatsSource,
};

const DEFAULT_CONFIG: &str = "fundscope.toml";

#[derive(Parser)]
#[command(
    name = "fundscope",
    about = "FundScope CLI: risk-adjusted fund ranking from public statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file.
    InitConfig {
        /// Destination path.
        #[arg(long, default_value = DEFAULT_CONFIG)]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Fetch statistics for every catalog entry, score, rank, and save.
    Fetch {
        /// Path to a TOML config file. Defaults to ./fundscope.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Statistics endpoint: maisretorno or stats-api.
        #[arg(long, default_value = "maisretorno")]
        source: StatsSource,

        /// Do not query the secondary listing.
        #[arg(long, default_value_t = false)]
        skip_offerings: bool,

        /// Output directory. Overrides the config value.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Fetch the secondary listing and report how many funds it offers.
    Offerings {
        /// Path to a TOML config file. Defaults to ./fundscope.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Filter a saved result table for the profitability/volatility chart.
    Filter {
        /// Result table written by `fetch`.
        #[arg(long)]
        input: PathBuf,

        /// Horizon: 12m, 36m, 60m or begin. Defaults to the config value.
        #[arg(long)]
        horizon: Option<Horizon>,

        /// Start from the suggested bounds instead of the data range.
        #[arg(long, default_value_t = false)]
        suggested: bool,

        #[arg(long, allow_negative_numbers = true)]
        min_profitability: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        max_profitability: Option<f64>,

        #[arg(long)]
        min_volatility: Option<f64>,

        #[arg(long)]
        max_volatility: Option<f64>,

        /// Path to a TOML config file. Defaults to ./fundscope.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the points here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { path, force } => run_init_config(&path, force),
        Commands::Fetch {
            config,
            source,
            skip_offerings,
            output_dir,
        } => run_fetch(config.as_deref(), source, skip_offerings, output_dir),
        Commands::Offerings { config } => run_offerings(config.as_deref()),
        Commands::Filter {
            input,
            horizon,
            suggested,
            min_profitability,
            max_profitability,
            min_volatility,
            max_volatility,
            config,
            output,
        } => {
            let overrides = BoundOverrides {
                min_profitability,
                max_profitability,
                min_volatility,
                max_volatility,
            };
            run_filter(
                &input,
                horizon,
                suggested,
                overrides,
                config.as_deref(),
                output.as_deref(),
            )
        }
    }
}

/// Explicit `--config`, else `./fundscope.toml` if it exists, else defaults.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Ok(PipelineConfig::from_file(Path::new(DEFAULT_CONFIG))?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let toml = PipelineConfig::default().to_toml()?;
    std::fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Config written to: {}", path.display());
    Ok(())
}

fn run_fetch(
    config_path: Option<&Path>,
    source: StatsSource,
    skip_offerings: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let report = run_from_config(&config, source, skip_offerings, &StdoutProgress)?;

    print_summary(&report);

    let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let paths = save_artifacts(&report, &dir)?;
    println!("Ranked table: {}", paths.latest.display());
    println!("Versioned copy: {}", paths.versioned.display());

    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!();
    println!("Loaded:    {}", report.loaded);
    println!("Found:     {}", report.found_count());
    println!("Not found: {}", report.not_found_count());
    if let Some(n) = report.offerings_count {
        let available = report
            .records
            .iter()
            .filter(|r| r.available_on_secondary)
            .count();
        println!("Offered:   {available} of {} ranked ({n} listed)", report.found_count());
    }
    if !report.not_found.is_empty() {
        println!("Not found identifiers: {}", report.not_found_identifiers().join(", "));
    }

    println!();
    println!("{:>4}  {:<16} {:<40} {:>9}", "#", "CNPJ", "Name", "Score");
    for (i, r) in report.records.iter().take(10).enumerate() {
        let asset = &r.scored.asset;
        let score = r
            .scored
            .scores
            .score_all
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "-".into());
        let name: String = asset.name.chars().take(40).collect();
        println!("{:>4}  {:<16} {:<40} {:>9}", i + 1, asset.identifier.as_str(), name, score);
    }
}

fn run_offerings(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = OfferingsProvider::new(
        &config.offerings.http_settings(&config.fetch),
        config.offerings.identifier_field.clone(),
    )?;
    let catalog = collect_offerings(&provider, &config.offerings.page_request());

    println!("Pages fetched: {}", catalog.pages_fetched);
    if catalog.pages_skipped > 0 {
        println!("Pages skipped: {}", catalog.pages_skipped);
    }
    println!("Listed funds:  {}", catalog.len());
    println!("Identifiers:   {}", catalog.identifiers().len());
    Ok(())
}

struct BoundOverrides {
    min_profitability: Option<f64>,
    max_profitability: Option<f64>,
    min_volatility: Option<f64>,
    max_volatility: Option<f64>,
}

impl BoundOverrides {
    fn apply(&self, base: ChartBounds) -> ChartBounds {
        ChartBounds {
            min_profitability: self.min_profitability.unwrap_or(base.min_profitability),
            max_profitability: self.max_profitability.unwrap_or(base.max_profitability),
            min_volatility: self.min_volatility.unwrap_or(base.min_volatility),
            max_volatility: self.max_volatility.unwrap_or(base.max_volatility),
        }
    }
}

fn run_filter(
    input: &Path,
    horizon: Option<Horizon>,
    suggested: bool,
    overrides: BoundOverrides,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let records = load_records_csv(input)?;
    let horizon = horizon.unwrap_or(config.chart.horizon);

    let base = if suggested {
        ChartBounds::suggested(&config.chart)
    } else {
        match ChartBounds::from_data(&records, horizon) {
            Some(b) => b,
            None => bail!("no fund in {} has {horizon} data", input.display()),
        }
    };
    let bounds = overrides.apply(base);
    if bounds.min_profitability > bounds.max_profitability
        || bounds.min_volatility > bounds.max_volatility
    {
        bail!("minimum bound exceeds maximum bound");
    }

    let points = chart_points(&records, horizon, &bounds);
    tracing::info!(
        horizon = %horizon,
        rows = records.len(),
        points = points.len(),
        "chart filter applied"
    );

    let csv = export_chart_csv(&points)?;
    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{} points written to: {}", points.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
