//! csep-xval - quantile-score cross-validation CLI
//!
//! Compares live consistency-test quantiles against a published reference
//! table and draws the signed-difference chart.
//!
//! ## Commands
//!
//! - `compare`: Run the full comparison and write the chart and reports
//! - `catalog`: Parse the reference catalog and summarise it
//! - `reference`: Print a reference quantile table in table order

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use csep_xval_core::{
    init_tracing, load_catalog, load_reference_table, run, CatalogSummary, ExperimentConfig,
    RunReport,
};

#[derive(Parser)]
#[command(name = "csep-xval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-validate forecast test quantiles against a reference table", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare live results with the reference table and draw the chart
    Compare {
        /// Experiment config (TOML). Built-in defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the catalog path
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Override the reference table path
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Override the live results path
        #[arg(long)]
        results: Option<PathBuf>,

        /// Override the chart output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on the first non-numeric reference cell
        #[arg(long)]
        strict: bool,

        /// Skip drawing the chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Parse a catalog file and print a summary
    Catalog {
        /// Catalog file
        path: PathBuf,

        /// Print every parsed event as JSON
        #[arg(long)]
        dump: bool,
    },

    /// Print a reference quantile table in table order
    Reference {
        /// Reference CSV file
        path: PathBuf,
    },
}

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Default)]
struct CompareOverrides {
    catalog: Option<PathBuf>,
    reference: Option<PathBuf>,
    results: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    no_chart: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Compare {
            config,
            catalog,
            reference,
            results,
            output,
            strict,
            no_chart,
        } => cmd_compare(
            config.as_deref(),
            CompareOverrides {
                catalog,
                reference,
                results,
                output,
                strict,
                no_chart,
            },
        ),
        Commands::Catalog { path, dump } => cmd_catalog(&path, dump),
        Commands::Reference { path } => cmd_reference(&path),
    }
}

fn build_config(path: Option<&Path>, overrides: CompareOverrides) -> Result<ExperimentConfig> {
    let mut config = match path {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => ExperimentConfig::default(),
    };

    if let Some(catalog) = overrides.catalog {
        config.inputs.catalog = catalog;
    }
    if let Some(reference) = overrides.reference {
        config.inputs.reference = reference;
    }
    if let Some(results) = overrides.results {
        config.inputs.results = results;
    }
    if let Some(output) = overrides.output {
        config.output.chart = output;
    }
    if overrides.strict {
        config.stats.strict = true;
    }
    if overrides.no_chart {
        config.output.render_chart = false;
    }
    Ok(config)
}

fn cmd_compare(path: Option<&Path>, overrides: CompareOverrides) -> Result<()> {
    let config = build_config(path, overrides)?;
    let report = run(&config).context("Comparison failed")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let s = &report.comparison.summary;
    println!(
        "Compared {} cells across {} models ({} unavailable)",
        s.differences.len(),
        report.reference.model_count(),
        s.unavailable
    );
    println!("Avg. diff: {:.6}", s.mean);
    println!("Std. error: {:.6}", s.standard_error);
    println!("95% band: [{:.6}, {:.6}]", s.band.lower, s.band.upper);
    for path in &report.written {
        println!("Wrote {}", path.display());
    }
}

fn cmd_catalog(path: &Path, dump: bool) -> Result<()> {
    let events =
        load_catalog(path).with_context(|| format!("Failed to load catalog {:?}", path))?;

    if dump {
        let json = serde_json::to_string_pretty(&events).context("Failed to serialize events")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", format_catalog_summary(&CatalogSummary::from_events(&events)));
    Ok(())
}

fn format_catalog_summary(summary: &CatalogSummary) -> String {
    let mut out = format!("Events: {}", summary.event_count);
    if let (Some(first), Some(last)) = (summary.first_origin_time, summary.last_origin_time) {
        out.push_str(&format!("\nOrigin times: {} .. {} (ms)", first, last));
    }
    if let (Some(min), Some(max)) = (summary.min_magnitude, summary.max_magnitude) {
        out.push_str(&format!("\nMagnitudes: {:.2} .. {:.2}", min, max));
    }
    out
}

fn cmd_reference(path: &Path) -> Result<()> {
    let grid = load_reference_table(path)
        .with_context(|| format!("Failed to load reference table {:?}", path))?;

    if grid.is_empty() {
        println!("No models in {:?}", path);
        return Ok(());
    }

    println!("model\t{}", grid.tests().join("\t"));
    for row in grid.rows() {
        println!("{}\t{}", row.model, row.values.join("\t"));
    }
    Ok(())
}
