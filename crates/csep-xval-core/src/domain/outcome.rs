//! Live evaluation outcomes handed over by the external evaluation engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantile score reported by a consistency test.
///
/// On the wire a scalar is a bare number and a paired quantile is a
/// two-element array `[lower, upper]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Quantile {
    /// Two-sided test: (lower, upper) quantile pair.
    Paired(f64, f64),

    /// One-sided test: a single quantile.
    Scalar(f64),
}

/// Outcome of one test for one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationOutcome {
    /// Test identifier, e.g. `n-test`.
    pub test: String,

    /// Model (forecast) name.
    pub model: String,

    pub quantile: Quantile,
}

/// Wire form of one outcome inside a results file; the test id is the map key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct OutcomeRecord {
    model: String,
    quantile: Quantile,
}

/// Live outcomes grouped by test id, each list ordered as the engine ran the models.
pub type EvaluationResults = BTreeMap<String, Vec<EvaluationOutcome>>;

/// Parse a results file of the form
/// `{ "n-test": [{ "model": "a", "quantile": [0.1, 0.9] }], "l-test": [...] }`.
pub fn parse_evaluation_results(json: &str) -> serde_json::Result<EvaluationResults> {
    let raw: BTreeMap<String, Vec<OutcomeRecord>> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|(test, records)| {
            let outcomes = records
                .into_iter()
                .map(|r| EvaluationOutcome {
                    test: test.clone(),
                    model: r.model,
                    quantile: r.quantile,
                })
                .collect();
            (test, outcomes)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_and_paired() {
        let json = r#"{
            "n-test": [{"model": "shen", "quantile": [0.12, 0.91]}],
            "l-test": [{"model": "shen", "quantile": 0.4}]
        }"#;
        let results = parse_evaluation_results(json).expect("parse");
        assert_eq!(
            results["n-test"][0].quantile,
            Quantile::Paired(0.12, 0.91)
        );
        assert_eq!(results["l-test"][0].quantile, Quantile::Scalar(0.4));
        assert_eq!(results["l-test"][0].test, "l-test");
        assert_eq!(results["l-test"][0].model, "shen");
    }

    #[test]
    fn test_parse_rejects_three_element_quantile() {
        let json = r#"{"n-test": [{"model": "a", "quantile": [0.1, 0.2, 0.3]}]}"#;
        assert!(parse_evaluation_results(json).is_err());
    }
}
