//! Lifecycle events of a comparison run.
//!
//! Each stage of [`crate::pipeline::run`] reports once through an `emit_*`
//! function with a stable `event` field, so JSON logs can be filtered by
//! stage. Excluded cells are the only `warn!` events.

use std::time::Instant;

use tracing::{info, warn};

use crate::stats::ErrorSummary;

/// Span guard for one run. Logs `run.finished` with the elapsed time on drop.
pub struct RunSpan {
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run: &str, seed: u64, nsims: u64) -> Self {
        let span = tracing::info_span!("xval.run", run = %run, seed, nsims).entered();
        Self {
            started: Instant::now(),
            _span: span,
        }
    }
}

impl Drop for RunSpan {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        // fields drop after this, so the span is still entered here
        info!(event = "run.finished", elapsed_ms = elapsed_ms);
    }
}

/// Emit event: reference catalog parsed.
pub fn emit_catalog_loaded(path: &str, events: usize) {
    info!(event = "catalog.loaded", path = %path, events = events);
}

/// Emit event: reference table parsed.
pub fn emit_reference_loaded(path: &str, models: usize, tests: usize) {
    info!(event = "reference.loaded", path = %path, models = models, tests = tests);
}

/// Emit event: live results reshaped into the reference keys.
pub fn emit_results_reconciled(models: usize, entries: usize) {
    info!(event = "results.reconciled", models = models, entries = entries);
}

/// Emit event: a cell was excluded from the aggregate (warning level).
pub fn emit_cell_unavailable(model: &str, test: &str, reason: &str) {
    warn!(event = "cell.unavailable", model = %model, test = %test, reason = %reason);
}

/// Emit event: aggregate error statistics computed.
pub fn emit_stats_computed(summary: &ErrorSummary) {
    info!(
        event = "stats.computed",
        cells = summary.differences.len(),
        unavailable = summary.unavailable,
        mean = summary.mean,
        standard_error = summary.standard_error,
        band_lower = summary.band.lower,
        band_upper = summary.band.upper,
    );
}

/// Emit event: comparison chart rendered.
pub fn emit_chart_rendered(path: &str, markers: usize, legend_entries: usize) {
    info!(
        event = "chart.rendered",
        path = %path,
        markers = markers,
        legend_entries = legend_entries,
    );
}
