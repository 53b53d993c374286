//! csep-xval Core Library
//!
//! Cross-validates quantile scores from a forecast-evaluation engine against a
//! published reference table: catalog and table parsing, reconciliation of
//! live results, signed error statistics, and the comparison chart.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod obs;
pub mod pipeline;
pub mod reconcile;
pub mod reference;
pub mod render;
pub mod reporting;
pub mod stats;
pub mod telemetry;

pub use catalog::{
    events_outside_window, load_catalog, month_number, parse_catalog, CatalogSummary,
};
pub use config::{ExperimentConfig, InputPaths, OutputOptions};
pub use domain::{
    parse_evaluation_results, CatalogError, ConfigError, EvaluationOutcome, EvaluationResults,
    EventRecord, Quantile, QuantileKind, ReconcileError, ReconciledGrid, ReconciledQuantile,
    ReferenceError, ReferenceGrid, RenderError, Result, StatsError, XvalError,
};
pub use obs::RunSpan;
pub use pipeline::{run, RunReport};
pub use reconcile::{load_evaluation_results, paired_test_ids, reconcile};
pub use reference::{load_reference_table, parse_reference_table};
pub use render::{render_svg, ChartLayout, ChartOptions, MarkerShape};
pub use reporting::{
    render_comparison_md, write_comparison_json, write_comparison_md, ComparisonArtifact,
};
pub use stats::{
    compare, normal_band, summarize, CellOutcome, Comparison, ComparisonCell, ConfidenceBand,
    ErrorSummary, StatsOptions,
};
pub use telemetry::{init_tracing, LogFormat};

/// csep-xval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
