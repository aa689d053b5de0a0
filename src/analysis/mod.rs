//! Indicator and summary engine.
//!
//! Pure functions over a canonical `OhlcvSeries`. Nothing here touches the
//! network or mutates its input; each function derives a fresh value object.

mod indicators;
mod summary;

pub use indicators::{
    daily_returns_pct, default_overlays, moving_average, standard_overlays, Overlay, OverlayPoint,
};
pub use summary::summarize;
