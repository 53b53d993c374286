//! Experiment configuration.
//!
//! Everything that changes what a run does lives here and is passed to
//! [`crate::pipeline::run`] explicitly. The file format is TOML:
//!
//! ```toml
//! name = "zechar2013"
//! start_date = "2006-01-01T00:00:00Z"
//! end_date = "2011-01-01T00:00:00Z"
//! seed = 12345
//! nsims = 1000000
//!
//! [forecasts]
//! shen = "forecasts/shen_et_al.geodetic.aftershock-fromXML.dat"
//!
//! [inputs]
//! catalog = "data/evaluation_catalog_zechar2013_merge.txt"
//! reference = "data/consistency_quantile_scores_from_zechar.csv"
//! results = "output/evaluation_results.json"
//!
//! [output]
//! chart = "output/pycsep_zechar_comparison.svg"
//!
//! [stats]
//! strict = false
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::ConfigError;
use crate::render::ChartOptions;
use crate::stats::StatsOptions;

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Run name, used for the tracing span and report headings.
    pub name: String,

    /// Start of the evaluation window (inclusive).
    pub start_date: DateTime<Utc>,

    /// End of the evaluation window (exclusive).
    pub end_date: DateTime<Utc>,

    /// Model name -> forecast file. Read by the evaluation engine; here it is
    /// only checked against the reference table's models.
    pub forecasts: BTreeMap<String, PathBuf>,

    /// Random seed the evaluation engine used.
    pub seed: u64,

    /// Number of simulations the evaluation engine used.
    pub nsims: u64,

    pub inputs: InputPaths,
    pub output: OutputOptions,
    pub chart: ChartOptions,
    pub stats: StatsOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputPaths {
    pub catalog: PathBuf,
    pub reference: PathBuf,
    pub results: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/evaluation_catalog_zechar2013_merge.txt"),
            reference: PathBuf::from("data/consistency_quantile_scores_from_zechar.csv"),
            results: PathBuf::from("output/evaluation_results.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputOptions {
    /// Where the SVG chart is written.
    pub chart: PathBuf,

    /// Directory receiving `comparison.json` and `comparison.md`.
    pub report_dir: PathBuf,

    /// Draw and write the chart.
    pub render_chart: bool,

    /// Write the JSON and Markdown report artifacts.
    pub write_artifacts: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            chart: PathBuf::from("output/pycsep_zechar_comparison.svg"),
            report_dir: PathBuf::from("output"),
            render_chart: true,
            write_artifacts: true,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: "comparison".to_string(),
            start_date: utc(2006, 1, 1),
            end_date: utc(2011, 1, 1),
            forecasts: BTreeMap::new(),
            seed: 12345,
            nsims: 1_000_000,
            inputs: InputPaths::default(),
            output: OutputOptions::default(),
            chart: ChartOptions::default(),
            stats: StatsOptions::default(),
        }
    }
}

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl ExperimentConfig {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    ///
    /// Relative input and output paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_date <= self.start_date {
            return Err(ConfigError::Invalid(format!(
                "end_date {} must be after start_date {}",
                self.end_date, self.start_date
            )));
        }
        if self.nsims == 0 {
            return Err(ConfigError::Invalid("nsims must be positive".to_string()));
        }
        if !(self.chart.y_limit.is_finite() && self.chart.y_limit > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "chart.y_limit must be positive, got {}",
                self.chart.y_limit
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid(
                "chart width and height must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.inputs.catalog,
            &mut self.inputs.reference,
            &mut self.inputs.results,
            &mut self.output.chart,
            &mut self.output.report_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_zechar2013_experiment() {
        let config = ExperimentConfig::default();
        assert_eq!(config.seed, 12345);
        assert_eq!(config.nsims, 1_000_000);
        assert_eq!(config.start_date.to_rfc3339(), "2006-01-01T00:00:00+00:00");
        assert_eq!(config.end_date.to_rfc3339(), "2011-01-01T00:00:00+00:00");
        assert!(config.output.render_chart);
        assert!(!config.stats.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ExperimentConfig::from_toml_str(
            r#"
            name = "zechar2013"
            nsims = 1000

            [forecasts]
            shen = "forecasts/shen.dat"
            kagan = "forecasts/kagan.dat"

            [chart]
            y_limit = 0.01

            [stats]
            strict = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.name, "zechar2013");
        assert_eq!(config.nsims, 1000);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.forecasts.len(), 2);
        assert_eq!(config.chart.y_limit, 0.01);
        assert_eq!(config.chart.width, 700);
        assert!(config.stats.strict);
    }

    #[test]
    fn test_workspace_experiment_toml_parses() {
        let config = ExperimentConfig::from_toml_str(include_str!("../../../experiment.toml"))
            .expect("parse experiment.toml");
        assert_eq!(config.name, "zechar2013");
        assert_eq!(config.forecasts.len(), 6);
        assert_eq!(config.chart, ChartOptions::default());
        assert_eq!(config.output, OutputOptions::default());
        assert_eq!(config.inputs, InputPaths::default());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let err = ExperimentConfig::from_toml_str(
            r#"
            start_date = "2011-01-01T00:00:00Z"
            end_date = "2006-01-01T00:00:00Z"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_y_limit_is_rejected() {
        let err = ExperimentConfig::from_toml_str("[chart]\ny_limit = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("y_limit"));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = ExperimentConfig::from_toml_str("seed = \"twelve\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("experiment.toml");
        std::fs::write(&path, "[inputs]\ncatalog = \"data/catalog.txt\"\n").expect("write");

        let config = ExperimentConfig::load(&path).expect("load");
        assert_eq!(config.inputs.catalog, dir.path().join("data/catalog.txt"));
        assert!(config.output.chart.starts_with(dir.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExperimentConfig::load(Path::new("/nonexistent/experiment.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
