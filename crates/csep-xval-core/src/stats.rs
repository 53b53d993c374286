//! Signed error statistics between live and reference quantiles.
//!
//! The reference grid is walked in its stored model and test order. Each
//! cell's live value is rounded (3 places for the halves of a two-sided test,
//! 6 otherwise) and the reference value subtracted from it.
//!
//! The aggregate band is the 2.5%/97.5% quantile pair of `N(0, sem)` where
//! `sem` is the population standard deviation of the differences divided by
//! `sqrt(n)`. It describes uncertainty in the *mean* difference and is drawn
//! once across the whole chart, not per test.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::domain::{
    QuantileKind, ReconcileError, ReconciledGrid, ReferenceGrid, Result, StatsError,
};
use crate::obs;

/// Lower cumulative probability of the confidence band.
pub const BAND_LOWER_P: f64 = 0.025;

/// Upper cumulative probability of the confidence band.
pub const BAND_UPPER_P: f64 = 0.975;

/// How unavailable cells affect the run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsOptions {
    /// Fail on the first cell that cannot be converted to a number instead of
    /// excluding it from the aggregate.
    #[serde(default)]
    pub strict: bool,
}

/// Result of comparing one (model, test) cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CellOutcome {
    Compared { reference: f64, difference: f64 },
    Unavailable { reason: String },
}

/// One cell of the comparison grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonCell {
    pub model: String,
    pub test: String,
    /// Live quantile after rounding.
    pub live: f64,
    pub kind: QuantileKind,
    /// Reference value as written in the table.
    pub reference_text: String,
    pub outcome: CellOutcome,
}

impl ComparisonCell {
    /// Signed difference, when the cell was comparable.
    pub fn difference(&self) -> Option<f64> {
        match self.outcome {
            CellOutcome::Compared { difference, .. } => Some(difference),
            CellOutcome::Unavailable { .. } => None,
        }
    }
}

/// Symmetric band around zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
}

/// Aggregate error statistics over all comparable cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorSummary {
    /// Signed differences in grid traversal order.
    pub differences: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of `differences`.
    pub std_dev: f64,
    pub standard_error: f64,
    pub band: ConfidenceBand,
    /// Cells excluded because a quantile was not numeric.
    pub unavailable: usize,
}

/// Per-cell comparison plus the aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub cells: Vec<ComparisonCell>,
    pub summary: ErrorSummary,
}

/// Compare every reference cell against its reconciled live value.
///
/// A reference cell with no live counterpart aborts with
/// [`ReconcileError::ReconciliationMissingKey`].
pub fn compare(
    reference: &ReferenceGrid,
    reconciled: &ReconciledGrid,
    options: StatsOptions,
) -> Result<Comparison> {
    let mut cells = Vec::with_capacity(reference.model_count() * reference.tests().len());

    for (model, test, reference_text) in reference.cells() {
        let live = reconciled
            .get(model, test)
            .ok_or_else(|| ReconcileError::ReconciliationMissingKey {
                model: model.to_string(),
                test: test.to_string(),
            })?;
        let rounded = live.kind.round(live.value);

        let checked = match (parse_quantile(reference_text), rounded.is_finite()) {
            (Some(reference), true) => Ok(reference),
            (None, _) => Err(("reference", reference_text.to_string())),
            (Some(_), false) => Err(("live", live.value.to_string())),
        };

        let outcome = match checked {
            Ok(reference) => CellOutcome::Compared {
                reference,
                difference: rounded - reference,
            },
            Err((side, value)) => {
                if options.strict {
                    return Err(StatsError::NonNumericQuantile {
                        model: model.to_string(),
                        test: test.to_string(),
                        side,
                        value,
                    }
                    .into());
                }
                let reason = format!("{side} value {value:?} is not numeric");
                obs::emit_cell_unavailable(model, test, &reason);
                CellOutcome::Unavailable { reason }
            }
        };

        cells.push(ComparisonCell {
            model: model.to_string(),
            test: test.to_string(),
            live: rounded,
            kind: live.kind,
            reference_text: reference_text.to_string(),
            outcome,
        });
    }

    let differences: Vec<f64> = cells.iter().filter_map(ComparisonCell::difference).collect();
    let unavailable = cells.len() - differences.len();
    let summary = summarize(differences, unavailable)?;
    obs::emit_stats_computed(&summary);

    Ok(Comparison { cells, summary })
}

fn parse_quantile(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Aggregate signed differences into an [`ErrorSummary`].
pub fn summarize(
    differences: Vec<f64>,
    unavailable: usize,
) -> std::result::Result<ErrorSummary, StatsError> {
    if differences.is_empty() {
        return Err(StatsError::NoComparableCells);
    }
    let n = differences.len() as f64;
    let mean = differences.iter().sum::<f64>() / n;
    let variance = differences.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let standard_error = std_dev / n.sqrt();
    let band = normal_band(standard_error)?;

    Ok(ErrorSummary {
        differences,
        mean,
        std_dev,
        standard_error,
        band,
        unavailable,
    })
}

/// 95% band of a zero-mean normal with the given scale.
///
/// A zero scale collapses the band to `(0.0, 0.0)`.
pub fn normal_band(scale: f64) -> std::result::Result<ConfidenceBand, StatsError> {
    if scale == 0.0 {
        return Ok(ConfidenceBand {
            lower: 0.0,
            upper: 0.0,
        });
    }
    let dist = Normal::new(0.0, scale).map_err(|e| StatsError::InvalidBand(e.to_string()))?;
    Ok(ConfidenceBand {
        lower: dist.inverse_cdf(BAND_LOWER_P),
        upper: dist.inverse_cdf(BAND_UPPER_P),
    })
}
