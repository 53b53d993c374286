use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::catalog::CatalogSummary;
use crate::config::ExperimentConfig;
use crate::domain::ReferenceGrid;
use crate::stats::{Comparison, ComparisonCell};

pub const SCHEMA_VERSION: &str = "1.0";

/// Experiment parameters echoed into the artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentArtifact {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub seed: u64,
    pub nsims: u64,
}

/// Content digest of one input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDigest {
    pub role: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Aggregate section persisted in comparison.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryArtifact {
    pub compared_cells: usize,
    pub unavailable_cells: usize,
    pub mean_difference: f64,
    pub std_dev: f64,
    pub standard_error: f64,
    pub band_lower: f64,
    pub band_upper: f64,
}

/// Canonical comparison artifact written alongside the chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonArtifact {
    pub schema_version: String,
    /// `csep-xval <crate version>` of the build that wrote the artifact.
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    pub experiment: ExperimentArtifact,
    pub inputs: Vec<InputDigest>,
    pub catalog: CatalogSummary,
    pub models: Vec<String>,
    pub tests: Vec<String>,
    pub cells: Vec<ComparisonCell>,
    pub summary: SummaryArtifact,
}

impl ComparisonArtifact {
    pub fn new(
        config: &ExperimentConfig,
        inputs: Vec<InputDigest>,
        catalog: CatalogSummary,
        reference: &ReferenceGrid,
        comparison: &Comparison,
    ) -> Self {
        let s = &comparison.summary;
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generator: format!("csep-xval {}", crate::VERSION),
            generated_at: Utc::now(),
            experiment: ExperimentArtifact {
                name: config.name.clone(),
                start_date: config.start_date,
                end_date: config.end_date,
                seed: config.seed,
                nsims: config.nsims,
            },
            inputs,
            catalog,
            models: reference.models().map(str::to_string).collect(),
            tests: reference.tests().to_vec(),
            cells: comparison.cells.clone(),
            summary: SummaryArtifact {
                compared_cells: s.differences.len(),
                unavailable_cells: s.unavailable,
                mean_difference: s.mean,
                std_dev: s.std_dev,
                standard_error: s.standard_error,
                band_lower: s.band.lower,
                band_upper: s.band.upper,
            },
        }
    }
}

/// SHA-256 hex digest of a file's bytes.
pub fn file_digest(role: &str, path: &Path) -> Result<InputDigest> {
    let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
    Ok(InputDigest {
        role: role.to_string(),
        path: path.to_path_buf(),
        sha256: hex::encode(Sha256::digest(&bytes)),
    })
}

/// Write comparison.json in pretty JSON format.
pub fn write_comparison_json(path: &Path, artifact: &ComparisonArtifact) -> Result<()> {
    let content =
        serde_json::to_string_pretty(artifact).context("serialize comparison artifact")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render a Markdown summary of the comparison.
pub fn render_comparison_md(artifact: &ComparisonArtifact) -> String {
    let s = &artifact.summary;
    let mut out = String::new();
    out.push_str(&format!("# Quantile Comparison: {}\n\n", artifact.experiment.name));
    out.push_str(&format!(
        "- window: {} to {}\n- seed: {}\n- simulations: {}\n- catalog events: {}\n\n",
        artifact.experiment.start_date.format("%Y-%m-%d"),
        artifact.experiment.end_date.format("%Y-%m-%d"),
        artifact.experiment.seed,
        artifact.experiment.nsims,
        artifact.catalog.event_count,
    ));

    out.push_str("## Summary\n");
    out.push_str(&format!(
        "- compared cells: {}\n- unavailable cells: {}\n- mean difference: {:.6}\n- standard error: {:.6}\n- 95% band: [{:.6}, {:.6}]\n\n",
        s.compared_cells,
        s.unavailable_cells,
        s.mean_difference,
        s.standard_error,
        s.band_lower,
        s.band_upper,
    ));

    out.push_str("## Cells\n");
    out.push_str("| model | test | live | reference | difference |\n");
    out.push_str("|---|---|---|---|---|\n");
    for cell in &artifact.cells {
        let diff = match cell.difference() {
            Some(d) => format!("{:+.6}", d),
            None => "n/a".to_string(),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell.model, cell.test, cell.live, cell.reference_text, diff
        ));
    }
    out
}

/// Write comparison.md.
pub fn write_comparison_md(path: &Path, artifact: &ComparisonArtifact) -> Result<()> {
    let md = render_comparison_md(artifact);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
