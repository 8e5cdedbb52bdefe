//! 도메인 모델.

pub mod snapshot;
pub mod symbols;

pub use snapshot::StockSnapshot;
pub use symbols::{default_watchlist, DEFAULT_TICKERS};
