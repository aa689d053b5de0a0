//! TCBS (Techcom Securities) upstream client.
//!
//! The bars-long-term endpoint is a GET keyed by unix timestamps and answers
//! with row-shaped JSON: one camelCase object per bar, the date carried as an
//! ISO `tradingDate` column. Deliberately the opposite shape of VCI's
//! columnar arrays; both funnel into the same `RawBar` rows.

use async_trait::async_trait;
use chrono::NaiveDate;
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::debug;

use crate::services::provider::{QuoteSource, RawBar, UpstreamError};

const BASE_URL: &str = "https://apipubaws.tcbs.com.vn/stock-insight/v1/stock/";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct BarsLongTermResponse {
    #[serde(default)]
    data: Vec<TcbsBar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TcbsBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    trading_date: String,
}

pub struct TcbsClient {
    client: HttpClient,
    base_url: String,
}

impl TcbsClient {
    pub fn new() -> Result<Self, UpstreamError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        Ok(TcbsClient {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    fn day_timestamp(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0)
    }

    async fn make_request(&self, url: &str) -> Result<String, UpstreamError> {
        let mut last_error: Option<UpstreamError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = StdDuration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1));
                debug!(
                    "TCBS retry {}/{}, waiting {:.1}s",
                    attempt + 1,
                    MAX_RETRIES,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let request = isahc::Request::builder()
                .uri(url)
                .method("GET")
                .header("Accept", "application/json")
                .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
                .body(())
                .map_err(|e| UpstreamError::InvalidResponse(format!("request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.text().await.map_err(|e| {
                            UpstreamError::InvalidResponse(format!("response body error: {}", e))
                        });
                    }
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_error = Some(UpstreamError::Status(status.as_u16()));
                        continue;
                    }
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

/// Decode a bars-long-term body into raw rows inside the requested range
pub fn parse_bars_long_term(
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawBar>, UpstreamError> {
    let response: BarsLongTermResponse = serde_json::from_str(body)?;

    let mut rows = Vec::with_capacity(response.data.len());
    for bar in response.data {
        let date = parse_trading_date(&bar.trading_date)?;
        if date < start || date > end {
            continue;
        }
        rows.push(RawBar {
            date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        });
    }

    Ok(rows)
}

/// `tradingDate` arrives as either "2024-03-01T00:00:00.000Z" or a bare
/// "2024-03-01" depending on the endpoint revision; the date prefix is stable
fn parse_trading_date(raw: &str) -> Result<NaiveDate, UpstreamError> {
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map_err(|_| UpstreamError::InvalidResponse(format!("bad tradingDate '{}'", raw)))
}

#[async_trait]
impl QuoteSource for TcbsClient {
    fn name(&self) -> &'static str {
        "tcbs"
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, UpstreamError> {
        let url = format!(
            "{}bars-long-term?ticker={}&type=stock&resolution=D&from={}&to={}",
            self.base_url,
            symbol,
            Self::day_timestamp(start),
            Self::day_timestamp(end),
        );

        debug!(
            "TCBS daily history request: symbol={}, start={}, end={}",
            symbol, start, end
        );

        let body = self.make_request(&url).await?;
        parse_bars_long_term(&body, start, end)
    }
}
