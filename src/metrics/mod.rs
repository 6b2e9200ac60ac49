pub mod summary;
pub mod timeseries;

pub use summary::SummaryMetrics;
pub use timeseries::{drawdowns, max_drawdown, max_drawdown_pct, returns, EquityPoint};
