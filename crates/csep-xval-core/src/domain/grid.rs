//! Keyed quantile grids: the published reference table and the reconciled
//! live results.
//!
//! [`ReferenceGrid`] carries model order and test order as explicit fields;
//! every downstream stage iterates it rather than a hash container.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ReferenceError;

/// One model's row of reference quantiles, aligned with [`ReferenceGrid::tests`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceRow {
    pub model: String,
    /// Original textual values, one per test column.
    pub values: Vec<String>,
}

/// Published reference quantiles keyed by model then test id.
///
/// Only built through [`ReferenceGrid::push_row`], which keeps every row as
/// wide as [`ReferenceGrid::tests`].
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReferenceGrid {
    tests: Vec<String>,
    rows: Vec<ReferenceRow>,
}

impl ReferenceGrid {
    /// Create an empty grid with the given test columns.
    pub fn new(tests: Vec<String>) -> Self {
        Self {
            tests,
            rows: Vec::new(),
        }
    }

    /// Append a model row. Rows keep insertion order.
    pub fn push_row(&mut self, model: String, values: Vec<String>) -> Result<(), ReferenceError> {
        let record = self.rows.len() + 1;
        if values.len() != self.tests.len() {
            return Err(ReferenceError::RowWidth {
                record,
                expected: self.tests.len(),
                found: values.len(),
            });
        }
        if self.rows.iter().any(|r| r.model == model) {
            return Err(ReferenceError::DuplicateModel { record, model });
        }
        self.rows.push(ReferenceRow { model, values });
        Ok(())
    }

    /// Test ids in column order.
    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    /// Rows in model order.
    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    /// Model names in first-seen order.
    pub fn models(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.model.as_str())
    }

    pub fn model_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reference value text for a (model, test) pair.
    pub fn get(&self, model: &str, test: &str) -> Option<&str> {
        let col = self.tests.iter().position(|t| t == test)?;
        self.rows
            .iter()
            .find(|r| r.model == model)?
            .values
            .get(col)
            .map(String::as_str)
    }

    /// All cells as `(model, test, value)` in model-major, column-minor order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.rows.iter().flat_map(move |row| {
            self.tests
                .iter()
                .zip(row.values.iter())
                .map(move |(test, value)| (row.model.as_str(), test.as_str(), value.as_str()))
        })
    }
}

/// How a reconciled quantile is rounded before comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuantileKind {
    /// One half of a paired two-sided count test quantile.
    TwoSided,
    /// Any single-valued test quantile.
    OneSided,
}

impl QuantileKind {
    /// Decimal places kept when comparing against the reference table.
    pub fn decimals(self) -> i32 {
        match self {
            Self::TwoSided => 3,
            Self::OneSided => 6,
        }
    }

    /// Round to [`Self::decimals`] places.
    ///
    /// Rounds the exact binary value, so `0.1235` (stored just below the
    /// decimal tie) becomes `0.123`. Scaling by `10^n` first would turn it
    /// into a false tie.
    pub fn round(self, value: f64) -> f64 {
        format!("{:.*}", self.decimals() as usize, value)
            .parse()
            .unwrap_or(value)
    }
}

/// A live quantile placed into the reference shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReconciledQuantile {
    pub value: f64,
    pub kind: QuantileKind,
}

/// Live results keyed by model then test id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconciledGrid {
    entries: BTreeMap<String, BTreeMap<String, ReconciledQuantile>>,
}

impl ReconciledGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one if the key was occupied.
    pub fn insert(
        &mut self,
        model: &str,
        test: &str,
        quantile: ReconciledQuantile,
    ) -> Option<ReconciledQuantile> {
        self.entries
            .entry(model.to_string())
            .or_default()
            .insert(test.to_string(), quantile)
    }

    pub fn get(&self, model: &str, test: &str) -> Option<&ReconciledQuantile> {
        self.entries.get(model)?.get(test)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of (model, test) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rounding_by_kind() {
        assert_eq!(QuantileKind::TwoSided.round(0.123456789), 0.123);
        assert_eq!(QuantileKind::OneSided.round(0.123456789), 0.123457);
        assert_eq!(QuantileKind::TwoSided.round(-0.0004), -0.0);
    }

    #[test]
    fn test_rounding_uses_exact_binary_value() {
        let rounded: Vec<f64> = [0.1235, 0.2345, 1.0005, 0.0045]
            .iter()
            .map(|v| QuantileKind::TwoSided.round(*v))
            .collect();
        assert_eq!(rounded, vec![0.123, 0.234, 1.0, 0.004]);

        assert_eq!(QuantileKind::OneSided.round(2.0000005), 2.000001);
        assert_eq!(QuantileKind::OneSided.round(-50.123456), -50.123456);
        assert!(QuantileKind::TwoSided.round(f64::NAN).is_nan());
    }

    #[test]
    fn test_reference_grid_cells_follow_row_then_column_order() {
        let mut grid = ReferenceGrid::new(strings(&["n-test1", "n-test2", "l-test"]));
        grid.push_row("zeta".to_string(), strings(&["0.1", "0.9", "0.5"]))
            .expect("row");
        grid.push_row("alpha".to_string(), strings(&["0.2", "0.8", "0.4"]))
            .expect("row");

        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], ("zeta", "n-test1", "0.1"));
        assert_eq!(cells[2], ("zeta", "l-test", "0.5"));
        assert_eq!(cells[3], ("alpha", "n-test1", "0.2"));
        assert_eq!(grid.models().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(grid.get("alpha", "n-test2"), Some("0.8"));
        assert_eq!(grid.get("alpha", "s-test"), None);
    }

    #[test]
    fn test_push_row_rejects_width_mismatch() {
        let mut grid = ReferenceGrid::new(strings(&["m-test", "s-test"]));
        let err = grid
            .push_row("a".to_string(), strings(&["0.1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::RowWidth {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_rejected_short_row_leaves_lookups_total() {
        let mut grid = ReferenceGrid::new(strings(&["m-test", "s-test"]));
        assert!(grid.push_row("a".to_string(), strings(&["0.1"])).is_err());
        grid.push_row("b".to_string(), strings(&["0.2", "0.3"]))
            .expect("row");

        assert_eq!(grid.get("a", "s-test"), None);
        assert_eq!(grid.get("b", "s-test"), Some("0.3"));
        assert_eq!(grid.cells().count(), 2);

        let json = serde_json::to_value(&grid).expect("serialize grid");
        assert_eq!(json["rows"][0]["values"][1], "0.3");
    }

    #[test]
    fn test_push_row_rejects_duplicate_model() {
        let mut grid = ReferenceGrid::new(strings(&["m-test"]));
        grid.push_row("a".to_string(), strings(&["0.1"])).expect("row");
        let err = grid
            .push_row("a".to_string(), strings(&["0.2"]))
            .unwrap_err();
        assert!(matches!(err, ReferenceError::DuplicateModel { record: 2, .. }));
    }

    #[test]
    fn test_reconciled_grid_insert_reports_previous() {
        let mut grid = ReconciledGrid::new();
        let q = ReconciledQuantile {
            value: 0.5,
            kind: QuantileKind::OneSided,
        };
        assert!(grid.insert("a", "m-test", q).is_none());
        assert_eq!(grid.insert("a", "m-test", q), Some(q));
        assert_eq!(grid.len(), 1);
        assert!(grid.get("b", "m-test").is_none());
    }
}
