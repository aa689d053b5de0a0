use crate::analysis::daily_returns_pct;
use crate::models::{OhlcvSeries, SummaryStats};

/// Compute the descriptive summary for a fetched period.
///
/// Volatility is the sample standard deviation (ddof = 1) of the fractional
/// day-over-day returns, expressed as a percentage and not annualized. A
/// series with fewer than two returns has no sample deviation, so volatility
/// is None for series shorter than three bars.
///
/// Callers guarantee a non-empty series; `normalize` rejects empty upstream
/// results before this stage runs.
pub fn summarize(series: &OhlcvSeries) -> SummaryStats {
    let first = series.first().expect("series is never empty");
    let latest = series.last().expect("series is never empty");

    let highest_price = series
        .bars
        .iter()
        .map(|bar| bar.high)
        .fold(f64::MIN, f64::max);
    let lowest_price = series
        .bars
        .iter()
        .map(|bar| bar.low)
        .fold(f64::MAX, f64::min);

    let price_change = latest.close - first.close;
    let price_change_pct = price_change / first.close * 100.0;

    let total_volume: u64 = series.bars.iter().map(|bar| bar.volume).sum();
    let avg_volume = total_volume as f64 / series.len() as f64;
    let max_volume = series.bars.iter().map(|bar| bar.volume).max().unwrap_or(0);

    SummaryStats {
        symbol: series.symbol.clone(),
        latest_price: latest.close,
        latest_date: latest.date,
        highest_price,
        lowest_price,
        price_change,
        price_change_pct,
        avg_volume,
        max_volume,
        volatility: volatility_pct(series),
        data_points: series.len(),
    }
}

/// Sample std deviation of fractional daily returns, as a percentage
fn volatility_pct(series: &OhlcvSeries) -> Option<f64> {
    let returns: Vec<f64> = daily_returns_pct(series)
        .into_iter()
        .flatten()
        .map(|pct| pct / 100.0)
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use crate::models::OhlcvBar;

    fn daily_series(closes: &[f64], volume: u64) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                OhlcvBar::new(
                    start + Duration::days(i as i64),
                    close,
                    close + 2.0,
                    close - 2.0,
                    close,
                    volume,
                )
            })
            .collect();
        OhlcvSeries {
            symbol: "TEST".to_string(),
            bars,
        }
    }

    #[test]
    fn test_summary_scenario() {
        let series = daily_series(&[100.0, 102.0, 99.0, 101.0, 105.0], 1000);
        let summary = summarize(&series);

        assert_eq!(summary.latest_price, 105.0);
        assert_eq!(summary.latest_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(summary.highest_price >= 105.0);
        assert_eq!(summary.lowest_price, 97.0);
        assert!((summary.price_change - 5.0).abs() < 1e-9);
        assert!((summary.price_change_pct - 5.0).abs() < 1e-9);
        assert!((summary.avg_volume - 1000.0).abs() < 1e-9);
        assert_eq!(summary.max_volume, 1000);
        assert_eq!(summary.data_points, 5);
    }

    #[test]
    fn test_price_change_pct_exact() {
        let series = daily_series(&[84.5, 91.2, 88.0, 90.3], 500);
        let summary = summarize(&series);
        let expected = 100.0 * (90.3 - 84.5) / 84.5;
        assert!((summary.price_change_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_bar_series() {
        let series = daily_series(&[100.0], 1000);
        let summary = summarize(&series);

        assert_eq!(summary.price_change, 0.0);
        assert_eq!(summary.price_change_pct, 0.0);
        assert_eq!(summary.volatility, None);
        assert_eq!(summary.data_points, 1);
    }

    #[test]
    fn test_two_bar_series_has_no_sample_volatility() {
        // One return only: sample deviation (ddof=1) is undefined
        let series = daily_series(&[100.0, 110.0], 1000);
        assert_eq!(summarize(&series).volatility, None);
    }

    #[test]
    fn test_volatility_known_value() {
        // Returns: 0.10, -0.10; mean 0; sample variance = (0.01+0.01)/1 = 0.02
        let series = daily_series(&[100.0, 110.0, 99.0], 1000);
        let summary = summarize(&series);

        let expected = (0.02_f64).sqrt() * 100.0;
        assert!((summary.volatility.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_does_not_mutate_input() {
        let series = daily_series(&[100.0, 102.0, 99.0], 1000);
        let before = series.clone();
        let _ = summarize(&series);
        assert_eq!(series, before);
    }
}
