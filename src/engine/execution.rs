use crate::instrument::FuturesContract;
use crate::portfolio::Side;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

//why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    TrailingStop,
    Reversal,
    ForcedExit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TrailingStop => write!(f, "Trailing Stop"),
            ExitReason::Reversal => write!(f, "Reversal"),
            ExitReason::ForcedExit => write!(f, "Forced Exit"),
        }
    }
}

//one closed round trip, appended to the ledger exactly once per closure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub side: Side,
    pub reason: ExitReason,
    //realized pnl net of the round-trip transaction cost
    pub net_pnl: f64,
    //stop distance that was in force for the whole trade
    pub stop_distance: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

//conservative fill for a triggered trailing stop
//if the bar opened beyond the stop level the market gapped through it,
//so the fill takes the worse of the open and the tick-rounded stop
pub fn conservative_stop_fill(
    side: Side,
    bar_open: f64,
    stop_price: f64,
    contract: &FuturesContract,
) -> f64 {
    let rounded_stop = contract.round_to_tick(stop_price);
    match side {
        Side::Long => bar_open.min(rounded_stop),
        Side::Short => bar_open.max(rounded_stop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_fill_at_stop_level_when_no_gap() {
        let contract = FuturesContract::txf();
        //opened above the stop: stop level itself is achievable
        let fill = conservative_stop_fill(Side::Long, 115.0, 110.4, &contract);
        assert_eq!(fill, 110.0);
    }

    #[test]
    fn long_fill_at_open_when_gapped_below() {
        let contract = FuturesContract::txf();
        //opened below the stop: only the worse open is achievable
        let fill = conservative_stop_fill(Side::Long, 105.0, 110.0, &contract);
        assert_eq!(fill, 105.0);
    }

    #[test]
    fn short_fill_at_stop_level_when_no_gap() {
        let contract = FuturesContract::txf();
        let fill = conservative_stop_fill(Side::Short, 105.0, 110.6, &contract);
        assert_eq!(fill, 111.0);
    }

    #[test]
    fn short_fill_at_open_when_gapped_above() {
        let contract = FuturesContract::txf();
        let fill = conservative_stop_fill(Side::Short, 118.0, 110.0, &contract);
        assert_eq!(fill, 118.0);
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::TrailingStop.to_string(), "Trailing Stop");
        assert_eq!(ExitReason::Reversal.to_string(), "Reversal");
        assert_eq!(ExitReason::ForcedExit.to_string(), "Forced Exit");
    }
}
