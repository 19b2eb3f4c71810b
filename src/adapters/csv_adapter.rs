//! CSV file price adapter.
//!
//! Reads `<base>/<CODE>.csv`. Columns are located by header: `Close` is
//! required, the date comes from a `Date` column or else the first column
//! (yfinance writes dates under a `Price` header followed by `Ticker` and
//! `Date` metadata rows, which are skipped). Rows must already be in strictly
//! increasing date order.

use crate::domain::error::BacktestError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    position: Option<usize>,
}

struct Row {
    bar: PriceBar,
    position: Option<String>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code.trim().to_uppercase()))
    }

    /// Read one CSV file of prices, keeping bars within [start, end].
    pub fn read_file(
        path: &Path,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let rows = read_rows(path, false)?;
        Ok(rows
            .into_iter()
            .map(|r| r.bar)
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .collect())
    }

    /// Read prices together with a precomputed `Position` column.
    ///
    /// Blank and unparseable cells come back as NaN; the simulator treats
    /// them as no change.
    pub fn read_positions(path: &Path) -> Result<(Vec<PriceBar>, Vec<f64>), BacktestError> {
        let rows = read_rows(path, true)?;
        let positions = rows
            .iter()
            .map(|r| parse_position(r.position.as_deref().unwrap_or(""), r.bar.date))
            .collect();
        Ok((rows.into_iter().map(|r| r.bar).collect(), positions))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        Self::read_file(&self.csv_path(code), start_date, end_date)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktestError::PriceData {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktestError::PriceData {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if let (true, Some(stem)) = (is_csv, path.file_stem()) {
                symbols.push(stem.to_string_lossy().to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

fn read_rows(path: &Path, want_position: bool) -> Result<Vec<Row>, BacktestError> {
    let content = fs::read_to_string(path).map_err(|e| BacktestError::PriceData {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    parse_rows(&content, &path.display().to_string(), want_position)
}

fn parse_rows(content: &str, source: &str, want_position: bool) -> Result<Vec<Row>, BacktestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns = locate_columns(rdr.headers()?, source, want_position)?;
    let mut rows: Vec<Row> = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;
        let date_cell = record.get(columns.date).unwrap_or("");

        let date = match parse_date(date_cell) {
            Some(d) => d,
            None if rows.is_empty() => {
                debug!(source, line, cell = date_cell, "skipping metadata row");
                continue;
            }
            None => {
                return Err(BacktestError::PriceData {
                    reason: format!("{} line {}: invalid date '{}'", source, line, date_cell),
                });
            }
        };

        if let Some(previous) = rows.last().map(|r| r.bar.date) {
            if date == previous {
                return Err(BacktestError::PriceData {
                    reason: format!("{} line {}: duplicate date {}", source, line, date),
                });
            }
            if date < previous {
                return Err(BacktestError::NonMonotonicDates {
                    index: rows.len(),
                    previous,
                    current: date,
                });
            }
        }

        let close_cell = record.get(columns.close).unwrap_or("");
        let close: f64 = close_cell.parse().map_err(|_| BacktestError::PriceData {
            reason: format!("{} line {}: invalid close '{}'", source, line, close_cell),
        })?;
        if !(close.is_finite() && close > 0.0) {
            return Err(BacktestError::PriceData {
                reason: format!("{} line {}: close {} is not positive", source, line, close),
            });
        }

        rows.push(Row {
            bar: PriceBar::new(date, close),
            position: columns
                .position
                .map(|idx| record.get(idx).unwrap_or("").to_string()),
        });
    }

    Ok(rows)
}

fn locate_columns(
    headers: &csv::StringRecord,
    source: &str,
    want_position: bool,
) -> Result<Columns, BacktestError> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let close = find("close").ok_or_else(|| BacktestError::PriceData {
        reason: format!("{}: no Close column", source),
    })?;
    let date = find("date").unwrap_or(0);
    let position = match (want_position, find("position")) {
        (true, None) => {
            return Err(BacktestError::PriceData {
                reason: format!("{}: no Position column", source),
            });
        }
        (true, found) => found,
        (false, _) => None,
    };

    Ok(Columns {
        date,
        close,
        position,
    })
}

/// `YYYY-MM-DD`, ignoring any time-of-day suffix.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let day = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_position(cell: &str, date: NaiveDate) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.parse::<f64>().unwrap_or_else(|_| {
        debug!(%date, value = cell, "unparseable position cell");
        f64::NAN
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,115.0,55000\n";
        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("MSFT.csv"), "Date,Close\n").unwrap();
        fs::write(path.join("notes.txt"), "not prices").unwrap();

        (dir, path)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_prices_reads_all_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_prices("aapl", None, None).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(2024, 1, 15));
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[2].date, date(2024, 1, 17));
        assert_eq!(bars[2].close, 115.0);
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let d = date(2024, 1, 16);
        let bars = adapter.fetch_prices("AAPL", Some(d), Some(d)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d);
    }

    #[test]
    fn fetch_prices_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_prices("XYZ", None, None),
            Err(BacktestError::PriceData { .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_prices("MSFT", None, None).unwrap().is_empty());
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn yfinance_layout_skips_metadata_rows() {
        let content = "Price,Close,High,Low,Open,Volume\n\
            Ticker,AAPL,AAPL,AAPL,AAPL,AAPL\n\
            Date,,,,,\n\
            2024-01-02,185.5,188.4,183.8,187.1,82488700\n\
            2024-01-03,184.2,185.8,183.4,184.2,58414500\n";
        let rows = parse_rows(content, "test", false).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bar.date, date(2024, 1, 2));
        assert_eq!(rows[0].bar.close, 185.5);
    }

    #[test]
    fn datetime_suffix_is_ignored() {
        let content = "Date,Close\n2024-01-02 00:00:00-05:00,10.5\n";
        let rows = parse_rows(content, "test", false).unwrap();
        assert_eq!(rows[0].bar.date, date(2024, 1, 2));
    }

    #[test]
    fn missing_close_column_fails() {
        let content = "Date,Open\n2024-01-02,10.0\n";
        assert!(matches!(
            parse_rows(content, "test", false),
            Err(BacktestError::PriceData { .. })
        ));
    }

    #[test]
    fn bad_close_value_fails() {
        let content = "Date,Close\n2024-01-02,10.0\n2024-01-03,abc\n";
        let err = parse_rows(content, "test", false).err().unwrap();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn non_positive_close_fails() {
        let content = "Date,Close\n2024-01-02,0\n";
        assert!(parse_rows(content, "test", false).is_err());
    }

    #[test]
    fn bad_date_after_data_fails() {
        let content = "Date,Close\n2024-01-02,10.0\nyesterday,11.0\n";
        assert!(parse_rows(content, "test", false).is_err());
    }

    #[test]
    fn duplicate_dates_fail() {
        let content = "Date,Close\n2024-01-02,10.0\n2024-01-02,11.0\n";
        let err = parse_rows(content, "test", false).err().unwrap();
        assert!(err.to_string().contains("duplicate date 2024-01-02"));
    }

    #[test]
    fn read_positions_normalises_cells() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("signals.csv");
        fs::write(
            &file,
            "Date,Close,Position\n\
             2024-01-02,10,\n\
             2024-01-03,10,1.0\n\
             2024-01-04,12,oops\n\
             2024-01-05,9,-1\n",
        )
        .unwrap();

        let (bars, positions) = CsvAdapter::read_positions(&file).unwrap();
        assert_eq!(bars.len(), 4);
        assert!(positions[0].is_nan());
        assert_eq!(positions[1], 1.0);
        assert!(positions[2].is_nan());
        assert_eq!(positions[3], -1.0);
    }

    #[test]
    fn unordered_dates_fail() {
        let content = "Date,Close\n2024-01-02,10.0\n2024-01-04,11.0\n2024-01-03,12.0\n";
        let err = parse_rows(content, "test", false).err().unwrap();
        assert!(matches!(
            err,
            BacktestError::NonMonotonicDates { index: 2, previous, current }
                if previous == date(2024, 1, 4) && current == date(2024, 1, 3)
        ));
    }

    #[test]
    fn read_positions_rejects_unordered_rows() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("signals.csv");
        fs::write(
            &file,
            "Date,Close,Position\n\
             2024-01-03,9,-1\n\
             2024-01-01,10,1\n\
             2024-01-02,12,0\n",
        )
        .unwrap();

        assert!(matches!(
            CsvAdapter::read_positions(&file),
            Err(BacktestError::NonMonotonicDates { index: 1, .. })
        ));
    }

    #[test]
    fn read_positions_requires_column() {
        let (_dir, path) = setup_test_data();
        assert!(CsvAdapter::read_positions(&path.join("AAPL.csv")).is_err());
    }
}
