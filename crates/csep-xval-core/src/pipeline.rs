//! End-to-end comparison run.
//!
//! Loads the catalog, reference table, and live results named in an
//! [`ExperimentConfig`], reconciles and compares them, then writes whichever
//! outputs the config enables.

use std::path::{Path, PathBuf};

use crate::catalog::{events_outside_window, load_catalog, CatalogSummary};
use crate::config::ExperimentConfig;
use crate::domain::{ReferenceGrid, Result, XvalError};
use crate::obs::{self, RunSpan};
use crate::reconcile::{load_evaluation_results, reconcile};
use crate::reference::load_reference_table;
use crate::render::{render_svg, ChartLayout};
use crate::reporting::{
    file_digest, write_comparison_json, write_comparison_md, ComparisonArtifact,
};
use crate::stats::{compare, Comparison};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub catalog: CatalogSummary,
    pub reference: ReferenceGrid,
    pub comparison: Comparison,
    /// Present when the chart was rendered.
    pub layout: Option<ChartLayout>,
    /// Files written by the run, in write order.
    pub written: Vec<PathBuf>,
}

/// Run the comparison described by `config`.
pub fn run(config: &ExperimentConfig) -> Result<RunReport> {
    let _span = RunSpan::enter(&config.name, config.seed, config.nsims);
    let inputs = &config.inputs;

    let events = load_catalog(&inputs.catalog)?;
    obs::emit_catalog_loaded(&inputs.catalog.display().to_string(), events.len());
    let catalog = CatalogSummary::from_events(&events);
    let outside = events_outside_window(&events, config.start_date, config.end_date);
    if outside > 0 {
        tracing::warn!(
            events = outside,
            start = %config.start_date,
            end = %config.end_date,
            "catalog events fall outside the experiment window"
        );
    }

    let reference = load_reference_table(&inputs.reference)?;
    obs::emit_reference_loaded(
        &inputs.reference.display().to_string(),
        reference.model_count(),
        reference.tests().len(),
    );
    if !config.forecasts.is_empty() {
        for model in reference.models() {
            if !config.forecasts.contains_key(model) {
                tracing::warn!(model = %model, "reference model has no configured forecast");
            }
        }
    }

    let results = load_evaluation_results(&inputs.results)?;
    let reconciled = reconcile(&results)?;
    obs::emit_results_reconciled(reconciled.models().count(), reconciled.len());

    let comparison = compare(&reference, &reconciled, config.stats)?;
    tracing::info!("Avg. diff: {}", comparison.summary.mean);

    let mut written = Vec::new();
    let layout = if config.output.render_chart {
        let layout = ChartLayout::build(&reference, &comparison, &config.chart)?;
        let svg = render_svg(&layout, &config.chart)?;
        let path = &config.output.chart;
        write_file(path, svg.as_bytes())?;
        obs::emit_chart_rendered(
            &path.display().to_string(),
            layout.markers.len(),
            layout.legend.len(),
        );
        written.push(path.clone());
        Some(layout)
    } else {
        None
    };

    if config.output.write_artifacts {
        let digests = [
            ("catalog", &inputs.catalog),
            ("reference", &inputs.reference),
            ("results", &inputs.results),
        ]
        .into_iter()
        .map(|(role, path)| file_digest(role, path))
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(XvalError::Artifact)?;

        let artifact =
            ComparisonArtifact::new(config, digests, catalog.clone(), &reference, &comparison);
        let dir = &config.output.report_dir;
        std::fs::create_dir_all(dir).map_err(|e| XvalError::io(dir, e))?;

        let json_path = dir.join("comparison.json");
        write_comparison_json(&json_path, &artifact).map_err(XvalError::Artifact)?;
        written.push(json_path);

        let md_path = dir.join("comparison.md");
        write_comparison_md(&md_path, &artifact).map_err(XvalError::Artifact)?;
        written.push(md_path);
    }

    Ok(RunReport {
        catalog,
        reference,
        comparison,
        layout,
        written,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| XvalError::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| XvalError::io(path, e))
}
