pub mod provider;
pub mod tcbs;
pub mod vci;

pub use provider::{
    fetch_series, normalize, source_client, QuoteSource, RawBar, Source, UpstreamError,
};
pub use tcbs::TcbsClient;
pub use vci::VciClient;
