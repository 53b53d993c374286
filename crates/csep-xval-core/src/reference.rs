//! Reference quantile table loader.
//!
//! The table is comma-separated with a header row. The first column holds the
//! model name (its header text is ignored); every other header names a test.
//! Values stay textual until the statistics stage converts them.

use std::path::Path;

use crate::domain::{ReferenceError, ReferenceGrid, Result, XvalError};

const BOM: char = '\u{feff}';

/// Parse reference table text into a [`ReferenceGrid`].
pub fn parse_reference_table(text: &str) -> std::result::Result<ReferenceGrid, ReferenceError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ReferenceError::EmptyHeader);
    }
    let tests = headers.iter().skip(1).map(str::to_string).collect();
    let mut grid = ReferenceGrid::new(tests);

    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let model = fields.next().unwrap_or_default().to_string();
        grid.push_row(model, fields.map(str::to_string).collect())?;
    }

    Ok(grid)
}

/// Read and parse a reference table file.
pub fn load_reference_table(path: &Path) -> Result<ReferenceGrid> {
    let text = std::fs::read_to_string(path).map_err(|e| XvalError::io(path, e))?;
    let grid = parse_reference_table(&text)?;
    tracing::debug!(
        path = %path.display(),
        models = grid.model_count(),
        tests = grid.tests().len(),
        "parsed reference table"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\u{feff}model,n-test1,n-test2,m-test,s-test,l-test
shen,0.102,0.911,0.452,0.061,0.013
kagan,0.310,0.731,0.481,0.003,0.0
helmstetter,0.501,0.532,0.470,0.642,0.540
";

    #[test]
    fn test_bom_is_stripped_and_order_kept() {
        let grid = parse_reference_table(TABLE).expect("parse");
        assert_eq!(
            grid.tests(),
            &["n-test1", "n-test2", "m-test", "s-test", "l-test"]
        );
        assert_eq!(
            grid.models().collect::<Vec<_>>(),
            vec!["shen", "kagan", "helmstetter"]
        );
        assert_eq!(grid.get("kagan", "s-test"), Some("0.003"));
    }

    #[test]
    fn test_first_column_header_is_ignored() {
        let grid = parse_reference_table("Forecast,l-test\nebel,-\n").expect("parse");
        assert_eq!(grid.tests(), &["l-test"]);
        assert_eq!(grid.get("ebel", "l-test"), Some("-"));
    }

    #[test]
    fn test_row_width_mismatch_is_fatal() {
        let err = parse_reference_table("model,m-test,s-test\na,0.1,0.2\nb,0.3\n").unwrap_err();
        assert!(matches!(err, ReferenceError::Csv(_)), "got {err:?}");
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = parse_reference_table("").unwrap_err();
        assert!(matches!(err, ReferenceError::EmptyHeader));
    }

    #[test]
    fn test_duplicate_model_is_fatal() {
        let err = parse_reference_table("model,m-test\na,0.1\na,0.2\n").unwrap_err();
        assert!(matches!(err, ReferenceError::DuplicateModel { record: 2, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reference.csv");
        std::fs::write(&path, TABLE).expect("write");
        let grid = load_reference_table(&path).expect("load");
        assert_eq!(grid.model_count(), 3);
    }
}
