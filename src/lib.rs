//a Rust-based trend-following backtest engine with fixed-at-entry trailing stops

pub mod config;
pub mod data;
pub mod engine;
pub mod instrument;
pub mod metrics;
pub mod portfolio;
pub mod signal;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ContractConfig, RunConfiguration};
    pub use crate::data::{load_csv, Bar};
    pub use crate::engine::{
        BacktestEngine, BacktestParams, BacktestReport, EngineError, ExitReason, TradeRecord,
    };
    pub use crate::instrument::FuturesContract;
    pub use crate::metrics::{EquityPoint, SummaryMetrics};
    pub use crate::portfolio::{OpenPosition, Side};
    pub use crate::signal::{generate_signals, SignalBar, SignalParams};
}
