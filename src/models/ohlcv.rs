use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Basic OHLCV (Open, High, Low, Close, Volume) record for one trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// Trading date (exchange calendar)
    pub date: NaiveDate,

    /// Opening price in VND
    pub open: f64,

    /// Highest price in VND
    pub high: f64,

    /// Lowest price in VND
    pub low: f64,

    /// Closing price in VND
    pub close: f64,

    /// Shares traded
    pub volume: u64,
}

impl OhlcvBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn field(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume as f64,
        }
    }
}

/// Selects one numeric column of a bar for indicator computations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Canonical daily series for a single symbol.
///
/// Bars are sorted ascending by date with no duplicate dates. Series are only
/// constructed through `services::provider::normalize` (or directly in tests),
/// which establishes that ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvSeries {
    pub symbol: String,
    pub bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|bar| bar.date)
    }

    pub fn values(&self, field: BarField) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(move |bar| bar.field(field))
    }
}
