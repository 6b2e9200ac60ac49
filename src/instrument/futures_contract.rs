use crate::portfolio::Side;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

//represents a futures contract specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesContract {
    //contract symbol (eg txf, es)
    pub symbol: String,

    //currency value of one full point move
    pub multiplier: f64,

    //minimum price fluctuation
    pub tick_size: f64,

    //transaction cost per side (commission + fees)
    pub cost_per_trade: f64,

    //hour of day of the monthly settlement window
    pub settlement_hour: u32,
}

impl FuturesContract {
    //creates a new futures contract
    pub fn new(
        symbol: String,
        multiplier: f64,
        tick_size: f64,
        cost_per_trade: f64,
        settlement_hour: u32,
    ) -> Self {
        FuturesContract {
            symbol,
            multiplier,
            tick_size,
            cost_per_trade,
            settlement_hour,
        }
    }

    //gross pnl for one contract from entry to exit
    pub fn pnl(&self, entry_price: f64, exit_price: f64, side: Side) -> f64 {
        match side {
            Side::Long => (exit_price - entry_price) * self.multiplier,
            Side::Short => (entry_price - exit_price) * self.multiplier,
        }
    }

    //round-trip transaction cost, charged once per closed trade
    pub fn round_trip_cost(&self) -> f64 {
        self.cost_per_trade * 2.0
    }

    //rounds a price to the nearest tick
    pub fn round_to_tick(&self, price: f64) -> f64 {
        (price / self.tick_size).round() * self.tick_size
    }

    //true if the timestamp falls in the monthly settlement window:
    //the tuesday between the 15th and 21st, at the settlement hour
    pub fn in_settlement_window(&self, ts: NaiveDateTime) -> bool {
        ts.weekday() == Weekday::Tue
            && (15..=21).contains(&ts.day())
            && ts.hour() == self.settlement_hour
    }

    //taiwan index futures: 200/point, 1-point tick, 300/side, 13:00 settlement
    pub fn txf() -> Self {
        FuturesContract::new("TXF".to_string(), 200.0, 1.0, 300.0, 13)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn pnl_signs_per_side() {
        let contract = FuturesContract::txf();
        assert_eq!(contract.pnl(100.0, 110.0, Side::Long), 2000.0);
        assert_eq!(contract.pnl(100.0, 110.0, Side::Short), -2000.0);
        assert_eq!(contract.pnl(100.0, 90.0, Side::Short), 2000.0);
    }

    #[test]
    fn round_trip_cost_is_both_sides() {
        assert_eq!(FuturesContract::txf().round_trip_cost(), 600.0);
    }

    #[test]
    fn rounds_to_one_point_tick() {
        let contract = FuturesContract::txf();
        assert_eq!(contract.round_to_tick(110.4), 110.0);
        assert_eq!(contract.round_to_tick(110.6), 111.0);
    }

    #[test]
    fn rounds_to_quarter_tick() {
        let contract = FuturesContract::new("ES".to_string(), 50.0, 0.25, 2.5, 16);
        assert!((contract.round_to_tick(4500.13) - 4500.25).abs() < 1e-9);
        assert!((contract.round_to_tick(4500.10) - 4500.0).abs() < 1e-9);
    }

    #[test]
    fn settlement_window_requires_all_three_conditions() {
        let contract = FuturesContract::txf();

        //2024-06-18 is the tuesday between the 15th and 21st
        assert!(contract.in_settlement_window(at(2024, 6, 18, 13)));

        //wrong hour
        assert!(!contract.in_settlement_window(at(2024, 6, 18, 12)));

        //tuesday outside the 15th..21st span
        assert!(!contract.in_settlement_window(at(2024, 6, 11, 13)));
        assert!(!contract.in_settlement_window(at(2024, 6, 25, 13)));

        //right span, wrong weekday (2024-06-19 is a wednesday)
        assert!(!contract.in_settlement_window(at(2024, 6, 19, 13)));
    }
}
