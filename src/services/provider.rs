use async_trait::async_trait;
use chrono::NaiveDate;
use std::str::FromStr;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{OhlcvBar, OhlcvSeries};
use crate::services::{TcbsClient, VciClient};

/// Failure inside a provider client, kept as the error source so callers see
/// the original cause behind `AppError::Upstream`
#[derive(ThisError, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] isahc::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Which upstream integration supplies raw history.
///
/// The choice is made once, at construction time, from CLI configuration.
/// Nothing downstream of the adapter can observe which variant was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Vci,
    Tcbs,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Vci => "vci",
            Source::Tcbs => "tcbs",
        }
    }
}

impl FromStr for Source {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vci" => Ok(Source::Vci),
            "tcbs" => Ok(Source::Tcbs),
            other => Err(AppError::InvalidInput(format!(
                "unknown data source '{}', expected vci or tcbs",
                other
            ))),
        }
    }
}

/// One raw daily row as a provider client decoded it from the wire.
///
/// Field names and casing differ per provider; clients map their own shape
/// (columnar arrays for VCI, camelCase rows for TCBS) into this before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Upstream retrieval seam. Implemented by the real provider clients and by
/// fakes in tests.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw daily history for an inclusive date range, in provider order
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<Vec<RawBar>, UpstreamError>;
}

/// Build the client for the configured source
pub fn source_client(source: Source) -> std::result::Result<Box<dyn QuoteSource>, UpstreamError> {
    match source {
        Source::Vci => Ok(Box::new(VciClient::new()?)),
        Source::Tcbs => Ok(Box::new(TcbsClient::new()?)),
    }
}

/// Normalize raw provider rows into the canonical series.
///
/// Sorts ascending by date and drops duplicate dates keeping the last
/// occurrence (upstream re-sends a corrected row after adjustments). An empty
/// input is `NoData` for the requested symbol and range; inconsistent bars
/// (low/high not bracketing open/close) are passed through with a warning.
pub fn normalize(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    raw: Vec<RawBar>,
) -> Result<OhlcvSeries> {
    if raw.is_empty() {
        return Err(AppError::NoData {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }

    let mut rows = raw;
    rows.sort_by_key(|bar| bar.date);

    let mut bars: Vec<OhlcvBar> = Vec::with_capacity(rows.len());
    for row in rows {
        let bar = OhlcvBar::new(row.date, row.open, row.high, row.low, row.close, row.volume);
        if bar.low > bar.open.min(bar.close) || bar.high < bar.open.max(bar.close) {
            warn!(
                "{} {}: inconsistent OHLC (o={} h={} l={} c={}), keeping as-is",
                symbol, bar.date, bar.open, bar.high, bar.low, bar.close
            );
        }
        match bars.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => bars.push(bar),
        }
    }

    debug!("Normalized {} bars for {}", bars.len(), symbol);

    Ok(OhlcvSeries {
        symbol: symbol.to_string(),
        bars,
    })
}

/// Retrieval front of the pipeline: fetch raw history from the configured
/// source and normalize it. Fails without retry on `NoData`; provider errors
/// carry their cause.
pub async fn fetch_series(
    source: &dyn QuoteSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<OhlcvSeries> {
    debug!(
        "Fetching {} from {} to {} via {}",
        symbol,
        start,
        end,
        source.name()
    );

    let raw = source
        .daily_history(symbol, start, end)
        .await
        .map_err(|e| AppError::Upstream {
            provider: source.name(),
            source: e,
        })?;

    normalize(symbol, start, end, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn raw(d: u32, close: f64) -> RawBar {
        RawBar {
            date: date(d),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn test_normalize_sorts_ascending() {
        let rows = vec![raw(5, 102.0), raw(1, 100.0), raw(3, 101.0)];
        let series = normalize("VNM", date(1), date(5), rows).unwrap();

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![date(1), date(3), date(5)]);
    }

    #[test]
    fn test_normalize_dedupes_keeping_last() {
        let rows = vec![raw(1, 100.0), raw(2, 50.0), raw(2, 51.0)];
        let series = normalize("VNM", date(1), date(2), rows).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, 51.0);
    }

    #[test]
    fn test_normalize_idempotent() {
        let rows = vec![raw(4, 103.0), raw(2, 101.0), raw(2, 99.0), raw(1, 100.0)];
        let once = normalize("VNM", date(1), date(4), rows).unwrap();

        let again_rows: Vec<RawBar> = once
            .bars
            .iter()
            .map(|bar| RawBar {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })
            .collect();
        let twice = normalize("VNM", date(1), date(4), again_rows).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_empty_is_no_data() {
        let err = normalize("XYZ", date(1), date(5), Vec::new()).unwrap_err();
        match err {
            AppError::NoData { ref symbol, start, end } => {
                assert_eq!(symbol, "XYZ");
                assert_eq!(start, date(1));
                assert_eq!(end, date(5));
            }
            other => panic!("expected NoData, got {:?}", other),
        }
        assert!(err.to_string().contains("XYZ"));
    }

    #[test]
    fn test_normalize_keeps_inconsistent_bars() {
        let rows = vec![RawBar {
            date: date(1),
            open: 100.0,
            high: 99.0, // high below open
            low: 98.0,
            close: 98.5,
            volume: 10,
        }];
        let series = normalize("VNM", date(1), date(1), rows).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().high, 99.0);
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("vci".parse::<Source>().unwrap(), Source::Vci);
        assert_eq!(" TCBS ".parse::<Source>().unwrap(), Source::Tcbs);
        assert!("yahoo".parse::<Source>().is_err());
    }

    struct FakeSource {
        rows: Vec<RawBar>,
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        fn name(&self) -> &'static str {
            "vci"
        }

        async fn daily_history(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> std::result::Result<Vec<RawBar>, UpstreamError> {
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn test_fetch_series_with_fake_source() {
        let fake = FakeSource {
            rows: vec![raw(2, 101.0), raw(1, 100.0)],
        };
        let series = fetch_series(&fake, "VNM", date(1), date(2)).await.unwrap();

        assert_eq!(series.symbol, "VNM");
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().date, date(1));
    }

    #[tokio::test]
    async fn test_fetch_series_empty_upstream_is_no_data() {
        let fake = FakeSource { rows: Vec::new() };
        let err = fetch_series(&fake, "XYZ", date(1), date(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NoData { .. }));
        assert!(err.to_string().contains("XYZ"));
    }
}
