//! Reshape live evaluation outcomes into the reference grid's keys.
//!
//! A paired (two-sided) quantile is split into two synthetic test ids by
//! appending `1` and `2` to the test id, matching how the reference table
//! stores the lower and upper halves in separate columns.

use std::path::Path;

use crate::domain::{
    parse_evaluation_results, EvaluationOutcome, EvaluationResults, Quantile, QuantileKind,
    ReconcileError, ReconciledGrid, ReconciledQuantile, Result, XvalError,
};

/// Synthetic test ids for the lower and upper halves of a paired test.
pub fn paired_test_ids(test: &str) -> (String, String) {
    (format!("{test}1"), format!("{test}2"))
}

/// Build a [`ReconciledGrid`] from live outcomes grouped by test id.
///
/// The map key is the test id; [`EvaluationOutcome::test`] is not consulted.
/// Any (model, test id) that would be written twice is rejected.
pub fn reconcile(
    results: &EvaluationResults,
) -> std::result::Result<ReconciledGrid, ReconcileError> {
    let mut grid = ReconciledGrid::new();
    for (test, outcomes) in results {
        for outcome in outcomes {
            insert_outcome(&mut grid, test, outcome)?;
        }
    }
    Ok(grid)
}

fn insert_outcome(
    grid: &mut ReconciledGrid,
    test: &str,
    outcome: &EvaluationOutcome,
) -> std::result::Result<(), ReconcileError> {
    match outcome.quantile {
        Quantile::Scalar(value) => insert_unique(
            grid,
            &outcome.model,
            test,
            ReconciledQuantile {
                value,
                kind: QuantileKind::OneSided,
            },
        ),
        Quantile::Paired(lower, upper) => {
            let (lower_id, upper_id) = paired_test_ids(test);
            for (half, value) in [(lower_id, lower), (upper_id, upper)] {
                insert_unique(
                    grid,
                    &outcome.model,
                    &half,
                    ReconciledQuantile {
                        value,
                        kind: QuantileKind::TwoSided,
                    },
                )?;
            }
            Ok(())
        }
    }
}

fn insert_unique(
    grid: &mut ReconciledGrid,
    model: &str,
    test: &str,
    quantile: ReconciledQuantile,
) -> std::result::Result<(), ReconcileError> {
    match grid.insert(model, test, quantile) {
        None => Ok(()),
        Some(_) => Err(ReconcileError::DuplicateOutcome {
            model: model.to_string(),
            test: test.to_string(),
        }),
    }
}

/// Read a live results file produced by the evaluation engine.
pub fn load_evaluation_results(path: &Path) -> Result<EvaluationResults> {
    let text = std::fs::read_to_string(path).map_err(|e| XvalError::io(path, e))?;
    let results = parse_evaluation_results(&text)?;
    tracing::debug!(
        path = %path.display(),
        tests = results.len(),
        "parsed live evaluation results"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(test: &str, model: &str, quantile: Quantile) -> EvaluationOutcome {
        EvaluationOutcome {
            test: test.to_string(),
            model: model.to_string(),
            quantile,
        }
    }

    fn results(outcomes: Vec<EvaluationOutcome>) -> EvaluationResults {
        let mut map = EvaluationResults::new();
        for o in outcomes {
            map.entry(o.test.clone()).or_default().push(o);
        }
        map
    }

    #[test]
    fn test_paired_outcome_splits_into_two_entries() {
        let grid = reconcile(&results(vec![outcome(
            "n-test",
            "shen",
            Quantile::Paired(0.1, 0.9),
        )]))
        .expect("reconcile");

        let lower = grid.get("shen", "n-test1").expect("lower half");
        let upper = grid.get("shen", "n-test2").expect("upper half");
        assert_eq!(lower.value, 0.1);
        assert_eq!(upper.value, 0.9);
        assert_eq!(lower.kind, QuantileKind::TwoSided);
        assert!(grid.get("shen", "n-test").is_none());
    }

    #[test]
    fn test_scalar_outcomes_keep_test_id() {
        let grid = reconcile(&results(vec![
            outcome("m-test", "shen", Quantile::Scalar(0.45)),
            outcome("m-test", "kagan", Quantile::Scalar(0.48)),
            outcome("l-test", "shen", Quantile::Scalar(0.01)),
        ]))
        .expect("reconcile");

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.get("kagan", "m-test").map(|q| q.value), Some(0.48));
        assert_eq!(
            grid.get("shen", "l-test").map(|q| q.kind),
            Some(QuantileKind::OneSided)
        );
    }

    #[test]
    fn test_outcomes_are_filed_under_their_map_key() {
        let mut map = EvaluationResults::new();
        map.insert(
            "n-test".to_string(),
            vec![outcome("stale", "shen", Quantile::Paired(0.2, 0.8))],
        );
        map.insert(
            "m-test".to_string(),
            vec![outcome("other", "shen", Quantile::Scalar(0.45))],
        );

        let grid = reconcile(&map).expect("reconcile");
        assert_eq!(grid.get("shen", "n-test1").map(|q| q.value), Some(0.2));
        assert_eq!(grid.get("shen", "m-test").map(|q| q.value), Some(0.45));
        assert!(grid.get("shen", "stale1").is_none());
        assert!(grid.get("shen", "other").is_none());
    }

    #[test]
    fn test_duplicate_outcome_is_rejected() {
        let err = reconcile(&results(vec![
            outcome("s-test", "shen", Quantile::Scalar(0.1)),
            outcome("s-test", "shen", Quantile::Scalar(0.2)),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateOutcome { .. }));
    }

    #[test]
    fn test_synthetic_id_collision_is_rejected() {
        let err = reconcile(&results(vec![
            outcome("n-test", "shen", Quantile::Paired(0.1, 0.9)),
            outcome("n-test1", "shen", Quantile::Scalar(0.3)),
        ]))
        .unwrap_err();
        match err {
            ReconcileError::DuplicateOutcome { model, test } => {
                assert_eq!(model, "shen");
                assert_eq!(test, "n-test1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
