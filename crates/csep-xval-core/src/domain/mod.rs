//! Domain models for csep-xval.
//!
//! Canonical definitions for the entities that flow through the pipeline:
//! - `EventRecord`: one event of the reference catalog
//! - `ReferenceGrid`: published quantiles, model and test order explicit
//! - `EvaluationOutcome`: a live test result from the evaluation engine
//! - `ReconciledGrid`: live quantiles reshaped to the reference keys

pub mod error;
pub mod event;
pub mod grid;
pub mod outcome;

pub use error::{
    CatalogError, ConfigError, ReconcileError, ReferenceError, RenderError, Result, StatsError,
    XvalError,
};
pub use event::EventRecord;
pub use grid::{QuantileKind, ReconciledGrid, ReconciledQuantile, ReferenceGrid, ReferenceRow};
pub use outcome::{parse_evaluation_results, EvaluationOutcome, EvaluationResults, Quantile};
