use serde::Serialize;

use crate::constants::{DEFAULT_MA_WINDOWS, VOLUME_MA_WINDOW};
use crate::models::{BarField, OhlcvSeries};

/// One derived value aligned to a source-series date.
///
/// `value` is None where the indicator is undefined (insufficient history).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPoint {
    pub date: chrono::NaiveDate,
    pub value: Option<f64>,
}

/// Named indicator series aligned to the date index of its source series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub label: String,
    pub points: Vec<OverlayPoint>,
}

impl Overlay {
    fn from_values(label: impl Into<String>, series: &OhlcvSeries, values: Vec<Option<f64>>) -> Self {
        let points = series
            .dates()
            .zip(values)
            .map(|(date, value)| OverlayPoint { date, value })
            .collect();
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Simple moving average of one bar field over a trailing window.
///
/// Position i holds the arithmetic mean of the field over [i-window+1, i]
/// once i >= window-1, and None before that. A window of zero or one larger
/// than the series yields all None rather than an error.
pub fn moving_average(series: &OhlcvSeries, field: BarField, window: usize) -> Vec<Option<f64>> {
    let values: Vec<f64> = series.values(field).collect();
    let mut out = vec![None; values.len()];

    if window == 0 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let start = i + 1 - window;
        let sum: f64 = values[start..=i].iter().sum();
        out[i] = Some(sum / window as f64);
    }

    out
}

/// Day-over-day percentage change of the close.
///
/// Position 0 has no prior close and is None.
pub fn daily_returns_pct(series: &OhlcvSeries) -> Vec<Option<f64>> {
    let closes: Vec<f64> = series.values(BarField::Close).collect();
    let mut out = vec![None; closes.len()];

    for i in 1..closes.len() {
        out[i] = Some((closes[i] - closes[i - 1]) / closes[i - 1] * 100.0);
    }

    out
}

/// The overlay set handed to serializers and external renderers: close-price
/// moving averages, the volume MA20, and daily returns.
pub fn standard_overlays(series: &OhlcvSeries, ma_windows: &[usize]) -> Vec<Overlay> {
    let mut overlays = Vec::with_capacity(ma_windows.len() + 2);

    for &window in ma_windows {
        overlays.push(Overlay::from_values(
            format!("ma{}", window),
            series,
            moving_average(series, BarField::Close, window),
        ));
    }

    overlays.push(Overlay::from_values(
        format!("volume_ma{}", VOLUME_MA_WINDOW),
        series,
        moving_average(series, BarField::Volume, VOLUME_MA_WINDOW),
    ));

    overlays.push(Overlay::from_values(
        "daily_return_pct",
        series,
        daily_returns_pct(series),
    ));

    overlays
}

/// Standard overlay set with the default close-MA windows
pub fn default_overlays(series: &OhlcvSeries) -> Vec<Overlay> {
    standard_overlays(series, &DEFAULT_MA_WINDOWS)
}
