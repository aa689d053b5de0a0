mod ohlcv;
mod summary;

pub use ohlcv::{BarField, OhlcvBar, OhlcvSeries};
pub use summary::SummaryStats;
