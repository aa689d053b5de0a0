use std::error::Error as StdError;

use serde::Serialize;

use crate::analysis::{default_overlays, summarize, Overlay};
use crate::error::AppError;
use crate::models::{OhlcvSeries, SummaryStats};
use crate::services::{fetch_series, source_client, Source};
use crate::utils::{format_vnd, normalize_symbol, parse_date, resolve_date_range};

#[derive(Serialize)]
struct QuoteOutput<'a> {
    summary: &'a SummaryStats,
    series: &'a OhlcvSeries,
    overlays: &'a [Overlay],
}

pub async fn run(
    symbol: String,
    start: Option<String>,
    end: Option<String>,
    source: String,
    format: String,
) {
    if !["text", "json", "csv"].contains(&format.as_str()) {
        eprintln!("❌ Unknown format '{}'", format);
        eprintln!("   Valid options: text, json, csv");
        std::process::exit(1);
    }

    let result = fetch_and_analyze(&symbol, start.as_deref(), end.as_deref(), &source).await;
    let (series, summary, overlays, start, end) = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("❌ {}", e);
            if let Some(cause) = e.source() {
                eprintln!("   caused by: {}", cause);
            }
            std::process::exit(1);
        }
    };

    match format.as_str() {
        "json" => {
            let output = QuoteOutput {
                summary: &summary,
                series: &series,
                overlays: &overlays,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("❌ Failed to serialize output: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "csv" => {
            if let Err(e) = write_csv(&series) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        _ => print_summary(&summary, start, end),
    }
}

async fn fetch_and_analyze(
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    source: &str,
) -> Result<
    (
        OhlcvSeries,
        SummaryStats,
        Vec<Overlay>,
        chrono::NaiveDate,
        chrono::NaiveDate,
    ),
    AppError,
> {
    let source: Source = source.parse()?;
    let symbol = normalize_symbol(symbol)?;
    let start = start.map(parse_date).transpose()?;
    let end = end.map(parse_date).transpose()?;
    let (start, end) = resolve_date_range(start, end)?;

    println!(
        "📡 Fetching {} from {} to {} via {}...",
        symbol,
        start,
        end,
        source.name()
    );

    let client = source_client(source).map_err(|e| AppError::Upstream {
        provider: source.name(),
        source: e,
    })?;
    let series = fetch_series(client.as_ref(), &symbol, start, end).await?;

    println!("✅ Fetched {} data points", series.len());

    let summary = summarize(&series);
    let overlays = default_overlays(&series);
    Ok((series, summary, overlays, start, end))
}

fn print_summary(summary: &SummaryStats, start: chrono::NaiveDate, end: chrono::NaiveDate) {
    let rule = "=".repeat(60);

    println!("\n{}", rule);
    println!("Summary Statistics for {}", summary.symbol);
    println!("Period: {} to {}", start, end);
    println!("{}", rule);

    println!("\nLatest Price (Close): {} VND", format_vnd(summary.latest_price));
    println!("Latest Date: {}", summary.latest_date);

    println!("\nPrice Range:");
    println!("  Highest: {} VND", format_vnd(summary.highest_price));
    println!("  Lowest: {} VND", format_vnd(summary.lowest_price));

    println!(
        "\nPrice Change: {} VND ({:+.2}%)",
        signed_vnd(summary.price_change),
        summary.price_change_pct
    );

    println!("\nVolume Statistics:");
    println!("  Average Daily Volume: {}", format_vnd(summary.avg_volume));
    println!("  Highest Volume: {}", format_vnd(summary.max_volume as f64));

    match summary.volatility {
        Some(vol) => println!("\nVolatility (Daily Std Dev): {:.2}%", vol),
        None => println!("\nVolatility (Daily Std Dev): n/a (fewer than 3 trading days)"),
    }

    println!("{}\n", rule);
}

fn signed_vnd(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", format_vnd(value))
    } else {
        format_vnd(value)
    }
}

fn write_csv(series: &OhlcvSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for bar in &series.bars {
        writer.write_record([
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
