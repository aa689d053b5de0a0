use chrono::NaiveDate;
use thiserror::Error as ThisError;

use crate::services::provider::UpstreamError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("no data available for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("{provider} provider error: {source}")]
    Upstream {
        provider: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
