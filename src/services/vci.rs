//! VCI (Vietcap) upstream client.
//!
//! VCI's gap-chart endpoint takes a POST with an end timestamp plus a bar
//! count and answers with columnar arrays (`o`, `h`, `l`, `c`, `v`, `t`), one
//! entry per bar, dates as unix timestamps.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::debug;

use crate::services::provider::{QuoteSource, RawBar, UpstreamError};

const BASE_URL: &str = "https://trading.vietcap.com.vn/api/";
const MAX_RETRIES: u32 = 3;

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
];

pub struct VciClient {
    client: HttpClient,
    base_url: String,
}

impl VciClient {
    pub fn new() -> Result<Self, UpstreamError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        Ok(VciClient {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    fn user_agent(&self) -> &'static str {
        use rand::seq::SliceRandom;
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// End-of-day timestamp VCI expects as the right edge of the window
    fn end_timestamp(end: NaiveDate) -> i64 {
        end.and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_else(|| Utc::now().timestamp())
    }

    /// Number of bars to request. Business days in the range plus a buffer;
    /// the endpoint is unreliable with exact counts on long histories.
    fn count_back(start: NaiveDate, end: NaiveDate) -> u32 {
        let mut business_days = 0u32;
        let mut current = start;
        while current <= end {
            let weekday = current.weekday().num_days_from_sunday();
            if weekday != 0 && weekday != 6 {
                business_days += 1;
            }
            current += ChronoDuration::days(1);
        }
        business_days + 100
    }

    async fn make_request(&self, url: &str, payload: &Value) -> Result<Value, UpstreamError> {
        let mut last_error: Option<UpstreamError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = StdDuration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1));
                debug!(
                    "VCI retry {}/{}, waiting {:.1}s",
                    attempt + 1,
                    MAX_RETRIES,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let body = serde_json::to_string(payload)?;
            let request = isahc::Request::builder()
                .uri(url)
                .method("POST")
                .header("Accept", "application/json, text/plain, */*")
                .header("Content-Type", "application/json")
                .header("User-Agent", self.user_agent())
                .header("Referer", "https://trading.vietcap.com.vn/")
                .header("Origin", "https://trading.vietcap.com.vn")
                .body(body)
                .map_err(|e| UpstreamError::InvalidResponse(format!("request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let text = resp.text().await.map_err(|e| {
                            UpstreamError::InvalidResponse(format!("response body error: {}", e))
                        })?;
                        return Ok(serde_json::from_str(&text)?);
                    }
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_error = Some(UpstreamError::Status(status.as_u16()));
                        continue;
                    }
                    // Other client errors are request problems, not transient
                    return Err(UpstreamError::Status(status.as_u16()));
                }
                Err(e) => {
                    last_error = Some(UpstreamError::Http(e));
                    continue;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| UpstreamError::InvalidResponse("retries exhausted".to_string())))
    }
}

fn column<'a>(data: &'a Value, key: &str) -> Result<&'a Vec<Value>, UpstreamError> {
    data[key]
        .as_array()
        .ok_or_else(|| UpstreamError::InvalidResponse(format!("column '{}' is not an array", key)))
}

/// Decode the columnar gap-chart payload into raw rows, keeping only bars
/// inside the requested range (VCI answers in count-back terms and routinely
/// returns extra leading history).
pub fn parse_gap_chart(
    response: &Value,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawBar>, UpstreamError> {
    let items = response
        .as_array()
        .ok_or_else(|| UpstreamError::InvalidResponse("expected top-level array".to_string()))?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let data = &items[0];
    for key in ["o", "h", "l", "c", "v", "t"] {
        if data.get(key).is_none() {
            return Err(UpstreamError::InvalidResponse(format!("missing key: {}", key)));
        }
    }

    let opens = column(data, "o")?;
    let highs = column(data, "h")?;
    let lows = column(data, "l")?;
    let closes = column(data, "c")?;
    let volumes = column(data, "v")?;
    let times = column(data, "t")?;

    let length = times.len();
    if [opens.len(), highs.len(), lows.len(), closes.len(), volumes.len()]
        .iter()
        .any(|&len| len != length)
    {
        return Err(UpstreamError::InvalidResponse(
            "inconsistent column lengths".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(length);
    for i in 0..length {
        // Timestamps arrive as either strings or integers depending on the
        // endpoint revision
        let timestamp = if let Some(ts) = times[i].as_str() {
            ts.parse::<i64>().map_err(|_| {
                UpstreamError::InvalidResponse(format!("bad timestamp '{}' at index {}", ts, i))
            })?
        } else if let Some(ts) = times[i].as_i64() {
            ts
        } else {
            return Err(UpstreamError::InvalidResponse(format!(
                "bad timestamp at index {}",
                i
            )));
        };

        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or_else(|| {
                UpstreamError::InvalidResponse(format!("unrepresentable timestamp {}", timestamp))
            })?
            .date_naive();

        if date < start || date > end {
            continue;
        }

        rows.push(RawBar {
            date,
            open: opens[i].as_f64().unwrap_or(0.0),
            high: highs[i].as_f64().unwrap_or(0.0),
            low: lows[i].as_f64().unwrap_or(0.0),
            close: closes[i].as_f64().unwrap_or(0.0),
            volume: volumes[i].as_u64().unwrap_or(0),
        });
    }

    Ok(rows)
}

#[async_trait]
impl QuoteSource for VciClient {
    fn name(&self) -> &'static str {
        "vci"
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, UpstreamError> {
        let url = format!("{}chart/OHLCChart/gap-chart", self.base_url);
        let payload = serde_json::json!({
            "timeFrame": "ONE_DAY",
            "symbols": [symbol],
            "to": Self::end_timestamp(end),
            "countBack": Self::count_back(start, end),
        });

        debug!(
            "VCI daily history request: symbol={}, start={}, end={}",
            symbol, start, end
        );

        let response = self.make_request(&url, &payload).await?;
        parse_gap_chart(&response, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        date(y, m, d).and_hms_opt(3, 0, 0).unwrap().and_utc().timestamp()
    }

    #[test]
    fn test_parse_gap_chart_columnar() {
        let response = serde_json::json!([{
            "o": [100.0, 102.0],
            "h": [103.0, 104.0],
            "l": [99.0, 101.0],
            "c": [102.0, 103.5],
            "v": [1500, 1800],
            "t": [ts(2024, 3, 1), ts(2024, 3, 4)],
        }]);

        let rows = parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 4)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2024, 3, 1));
        assert_eq!(rows[0].close, 102.0);
        assert_eq!(rows[1].volume, 1800);
    }

    #[test]
    fn test_parse_gap_chart_string_timestamps() {
        let response = serde_json::json!([{
            "o": [100.0],
            "h": [103.0],
            "l": [99.0],
            "c": [102.0],
            "v": [1500],
            "t": [ts(2024, 3, 1).to_string()],
        }]);

        let rows = parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_gap_chart_filters_out_of_range() {
        let response = serde_json::json!([{
            "o": [90.0, 100.0],
            "h": [93.0, 103.0],
            "l": [89.0, 99.0],
            "c": [92.0, 102.0],
            "v": [900, 1500],
            "t": [ts(2024, 2, 1), ts(2024, 3, 1)],
        }]);

        let rows = parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date(2024, 3, 1));
    }

    #[test]
    fn test_parse_gap_chart_empty_response() {
        let response = serde_json::json!([]);
        let rows = parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_gap_chart_missing_column() {
        let response = serde_json::json!([{
            "o": [100.0],
            "h": [103.0],
            "l": [99.0],
            "c": [102.0],
            "t": [ts(2024, 3, 1)],
        }]);

        let err = parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 1)).unwrap_err();
        assert!(err.to_string().contains("missing key: v"));
    }

    #[test]
    fn test_parse_gap_chart_inconsistent_lengths() {
        let response = serde_json::json!([{
            "o": [100.0, 101.0],
            "h": [103.0],
            "l": [99.0],
            "c": [102.0],
            "v": [1500],
            "t": [ts(2024, 3, 1)],
        }]);

        assert!(parse_gap_chart(&response, date(2024, 3, 1), date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_count_back_covers_range() {
        // 2024-03-04..2024-03-08 is a full business week
        let n = VciClient::count_back(date(2024, 3, 4), date(2024, 3, 8));
        assert_eq!(n, 105);
    }
}
