use chrono::NaiveDate;
use serde::Serialize;

/// Descriptive statistics for one fetched period.
///
/// Computed on demand by `analysis::summarize`, serialized to text by the CLI
/// and to JSON by the web API, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub symbol: String,

    /// Close of the most recent bar
    pub latest_price: f64,

    /// Date of the most recent bar
    pub latest_date: NaiveDate,

    /// Maximum of the high column over the period
    pub highest_price: f64,

    /// Minimum of the low column over the period
    pub lowest_price: f64,

    /// Latest close minus first close
    pub price_change: f64,

    /// Price change as a percentage of the first close
    pub price_change_pct: f64,

    /// Mean daily volume
    pub avg_volume: f64,

    /// Largest single-day volume
    pub max_volume: u64,

    /// Sample standard deviation of daily fractional returns, as a
    /// percentage. None when the period holds fewer than two returns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,

    /// Number of trading days in the period
    pub data_points: usize,
}
