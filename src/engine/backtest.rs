use crate::engine::execution::{conservative_stop_fill, ExitReason, TradeRecord};
use crate::instrument::FuturesContract;
use crate::metrics::EquityPoint;
use crate::portfolio::{OpenPosition, Side};
use crate::signal::SignalBar;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Non-monotonic timestamp at row {index}: {current} does not follow {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("Non-finite {field} at row {index}")]
    NonFiniteField { index: usize, field: &'static str },
    #[error("Conflicting long and short signals at row {index}")]
    ConflictingSignals { index: usize },
}

//run-wide simulation parameters, fixed for the whole run
#[derive(Debug, Clone)]
pub struct BacktestParams {
    //starting equity
    pub initial_capital: f64,

    //stop distance used when atr mode is off or atr is undefined at entry
    pub fallback_stop_distance: f64,

    //derive the stop distance from the entry bar's previous atr
    pub use_atr_stop: bool,

    //scales atr into a price distance
    pub atr_multiplier: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        BacktestParams {
            initial_capital: 1_000_000.0,
            fallback_stop_distance: 150.0,
            use_atr_stop: false,
            atr_multiplier: 5.0,
        }
    }
}

//result of a backtest: the trade ledger and the bar-aligned equity curve
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

//mutable simulation state threaded through the bar fold
//equity accumulates realized pnl only; an open position is carried here
//and is the single place position state lives
#[derive(Debug)]
struct EngineState {
    position: Option<OpenPosition>,
    equity: f64,
    trades: Vec<TradeRecord>,
    equity_curve: Vec<EquityPoint>,
}

impl EngineState {
    fn new(initial_capital: f64, bar_count: usize) -> Self {
        EngineState {
            position: None,
            equity: initial_capital,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(bar_count),
        }
    }

    //single exit path shared by every trigger site
    //realizes pnl, appends the trade record, resets to flat
    fn close_position(
        &mut self,
        contract: &FuturesContract,
        reason: ExitReason,
        exit_price: f64,
        exit_time: NaiveDateTime,
    ) {
        let Some(position) = self.position.take() else {
            return;
        };

        let net_pnl = contract.pnl(position.entry_price, exit_price, position.side)
            - contract.round_trip_cost();
        self.equity += net_pnl;

        self.trades.push(TradeRecord {
            entry_time: position.entry_time,
            exit_time,
            entry_price: position.entry_price,
            exit_price,
            side: position.side,
            reason,
            net_pnl,
            stop_distance: position.stop_distance,
        });
    }
}

//main backtest engine: a deterministic single-pass fold over the bars
pub struct BacktestEngine {
    params: BacktestParams,
    contract: FuturesContract,
}

impl BacktestEngine {
    //creates a new backtest engine
    pub fn new(params: BacktestParams, contract: FuturesContract) -> Self {
        BacktestEngine { params, contract }
    }

    //runs the simulation over a chronological, signal-annotated bar series
    //
    //input is validated before the loop; a failed run produces no ledger
    //and no curve. a position still open after the last bar stays open,
    //unrealized, and absent from the ledger
    pub fn run(&self, bars: &[SignalBar]) -> Result<BacktestReport, EngineError> {
        validate_bars(bars)?;

        let mut state = EngineState::new(self.params.initial_capital, bars.len());

        for bar in bars {
            self.step(&mut state, bar);
        }

        Ok(BacktestReport {
            trades: state.trades,
            equity_curve: state.equity_curve,
        })
    }

    //one simulation step
    fn step(&self, state: &mut EngineState, bar: &SignalBar) {
        //1) equity snapshot, dated at this bar, before this bar's own exits
        state.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: state.equity,
        });

        //2) scheduled forced exit: closes at the open and ends the bar;
        //no entry or trailing check runs on a forced-exit bar
        if state.position.is_some() && self.contract.in_settlement_window(bar.timestamp) {
            state.close_position(
                &self.contract,
                ExitReason::ForcedExit,
                bar.open,
                bar.timestamp,
            );
            return;
        }

        //3) entry / reversal, always at this bar's open
        if bar.signal_long {
            if state.position.as_ref().is_some_and(|p| p.is_short()) {
                state.close_position(&self.contract, ExitReason::Reversal, bar.open, bar.timestamp);
            }
            if state.position.is_none() {
                state.position = Some(OpenPosition::open(
                    Side::Long,
                    bar.open,
                    bar.timestamp,
                    self.stop_distance_at_entry(bar),
                ));
            }
        } else if bar.signal_short {
            if state.position.as_ref().is_some_and(|p| p.is_long()) {
                state.close_position(&self.contract, ExitReason::Reversal, bar.open, bar.timestamp);
            }
            if state.position.is_none() {
                state.position = Some(OpenPosition::open(
                    Side::Short,
                    bar.open,
                    bar.timestamp,
                    self.stop_distance_at_entry(bar),
                ));
            }
        }

        //4) trailing stop on whatever is open, including a position opened
        //this bar: an entry whose stop level sits inside the entry bar's
        //range closes the same bar
        let stop_fill = state.position.as_ref().and_then(|position| {
            if position.stop_hit(bar.high, bar.low) {
                Some(conservative_stop_fill(
                    position.side,
                    bar.open,
                    position.stop_price(),
                    &self.contract,
                ))
            } else {
                None
            }
        });

        if let Some(fill) = stop_fill {
            state.close_position(&self.contract, ExitReason::TrailingStop, fill, bar.timestamp);
        } else if let Some(position) = state.position.as_mut() {
            //no trigger: ratchet the extreme for the next bar
            position.update_extreme(bar.high, bar.low);
        }
    }

    //stop distance chosen once, at entry: atr-scaled when atr mode is on
    //and the entry bar carries a defined atr, else the fixed fallback
    fn stop_distance_at_entry(&self, bar: &SignalBar) -> f64 {
        if self.params.use_atr_stop {
            if let Some(atr_prev) = bar.atr_prev {
                return atr_prev * self.params.atr_multiplier;
            }
        }
        self.params.fallback_stop_distance
    }
}

//fail-fast input validation: runs in full before the first simulation step
fn validate_bars(bars: &[SignalBar]) -> Result<(), EngineError> {
    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteField { index, field });
            }
        }

        if bar.signal_long && bar.signal_short {
            return Err(EngineError::ConflictingSignals { index });
        }

        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(EngineError::NonMonotonicTimestamp {
                index,
                previous: bars[index - 1].timestamp,
                current: bar.timestamp,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn flat_bar(hour: u32) -> SignalBar {
        SignalBar {
            timestamp: ts(hour),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1000.0,
            atr_prev: None,
            signal_long: false,
            signal_short: false,
        }
    }

    #[test]
    fn rejects_non_monotonic_timestamps() {
        let mut bars = vec![flat_bar(9), flat_bar(10)];
        bars[1].timestamp = ts(9);

        let engine = BacktestEngine::new(BacktestParams::default(), FuturesContract::txf());
        assert!(matches!(
            engine.run(&bars),
            Err(EngineError::NonMonotonicTimestamp { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_nan_prices() {
        let mut bars = vec![flat_bar(9), flat_bar(10)];
        bars[1].low = f64::NAN;

        let engine = BacktestEngine::new(BacktestParams::default(), FuturesContract::txf());
        assert!(matches!(
            engine.run(&bars),
            Err(EngineError::NonFiniteField {
                index: 1,
                field: "low"
            })
        ));
    }

    #[test]
    fn rejects_conflicting_signals() {
        let mut bars = vec![flat_bar(9), flat_bar(10)];
        bars[1].signal_long = true;
        bars[1].signal_short = true;

        let engine = BacktestEngine::new(BacktestParams::default(), FuturesContract::txf());
        assert!(matches!(
            engine.run(&bars),
            Err(EngineError::ConflictingSignals { index: 1 })
        ));
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let engine = BacktestEngine::new(BacktestParams::default(), FuturesContract::txf());
        let report = engine.run(&[]).unwrap();
        assert!(report.trades.is_empty());
        assert!(report.equity_curve.is_empty());
    }

    #[test]
    fn equity_curve_has_one_point_per_bar() {
        let bars = vec![flat_bar(9), flat_bar(10), flat_bar(11)];
        let engine = BacktestEngine::new(BacktestParams::default(), FuturesContract::txf());
        let report = engine.run(&bars).unwrap();

        assert_eq!(report.equity_curve.len(), 3);
        for point in &report.equity_curve {
            assert_eq!(point.equity, 1_000_000.0);
        }
    }
}
