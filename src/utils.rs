use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::constants::{DEFAULT_LOOKBACK_DAYS, MARKET_TIMEZONE};
use crate::error::{AppError, Result};

/// Current date on the Vietnam exchange calendar
pub fn market_today() -> NaiveDate {
    let tz: Tz = match MARKET_TIMEZONE.parse() {
        Ok(tz) => tz,
        Err(e) => {
            tracing::warn!("Failed to parse timezone '{}': {}", MARKET_TIMEZONE, e);
            return Utc::now().date_naive();
        }
    };
    Utc::now().with_timezone(&tz).date_naive()
}

/// Validate and uppercase a ticker symbol
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("symbol must not be empty".to_string()));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidInput(format!(
            "symbol '{}' contains characters outside A-Z0-9",
            symbol
        )));
    }
    Ok(symbol)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Resolve an optional inclusive date range.
///
/// End defaults to today on the exchange calendar, start to 180 days before
/// the end, matching the original six-month default window.
pub fn resolve_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or_else(market_today);
    let start = start.unwrap_or(end - Duration::days(DEFAULT_LOOKBACK_DAYS));
    if start > end {
        return Err(AppError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok((start, end))
}

/// Format a price with thousands separators, no decimals (VND convention)
pub fn format_vnd(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
