pub mod backtest;
pub mod execution;

pub use backtest::{BacktestEngine, BacktestParams, BacktestReport, EngineError};
pub use execution::{conservative_stop_fill, ExitReason, TradeRecord};
