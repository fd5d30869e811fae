//! JSON fixture loading for price series.
//!
//! Stands in for the out-of-scope market-data fetcher: a fixture file holds a
//! JSON array of bars which is validated into a `PriceSeries`.

use std::fs;
use std::path::Path;

use protrader_common::{Result, ResultExt};

use super::{PriceBar, PriceSeries};

/// Load a price series from a JSON fixture file.
///
/// The file must contain a JSON array of objects with `date` (ISO-8601),
/// `open`, `high`, `low`, `close`, and `volume` fields.
pub fn load_series(path: &Path) -> Result<PriceSeries> {
    let raw = fs::read_to_string(path)
        .context(format!("reading price series from {}", path.display()))?;
    let bars: Vec<PriceBar> =
        serde_json::from_str(&raw).context(format!("parsing price series {}", path.display()))?;
    PriceSeries::new(bars)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_series_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"date": "2024-01-02", "open": 100.0, "high": 102.0, "low": 99.0, "close": 101.0, "volume": 1000000}},
                {{"date": "2024-01-03", "open": 101.0, "high": 103.0, "low": 100.0, "close": 102.5, "volume": 1200000}}
            ]"#
        )
        .unwrap();

        let series = load_series(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.last().close - 102.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_series_missing_file() {
        let err = load_series(Path::new("/nonexistent/prices.json")).unwrap_err();
        assert!(err.to_string().contains("reading price series"));
    }

    #[test]
    fn test_load_series_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_series(file.path()).is_err());
    }
}
