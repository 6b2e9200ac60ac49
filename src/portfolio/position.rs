use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

//direction of an open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "Long"),
            Side::Short => write!(f, "Short"),
        }
    }
}

//a single open position
//stop_distance is fixed at entry and never recomputed; only the
//trailing extreme moves, and only in the favorable direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub stop_distance: f64,
    //highest high since entry for longs, lowest low since entry for shorts
    pub extreme_since_entry: f64,
}

impl OpenPosition {
    //opens a position; the trailing extreme starts at the entry price
    pub fn open(side: Side, entry_price: f64, entry_time: NaiveDateTime, stop_distance: f64) -> Self {
        OpenPosition {
            side,
            entry_price,
            entry_time,
            stop_distance,
            extreme_since_entry: entry_price,
        }
    }

    //current trailing stop level
    pub fn stop_price(&self) -> f64 {
        match self.side {
            Side::Long => self.extreme_since_entry - self.stop_distance,
            Side::Short => self.extreme_since_entry + self.stop_distance,
        }
    }

    //true if this bar's range reaches the stop level
    pub fn stop_hit(&self, bar_high: f64, bar_low: f64) -> bool {
        match self.side {
            Side::Long => bar_low <= self.stop_price(),
            Side::Short => bar_high >= self.stop_price(),
        }
    }

    //ratchets the trailing extreme with this bar's favorable extreme
    //never moves against the position
    pub fn update_extreme(&mut self, bar_high: f64, bar_low: f64) {
        match self.side {
            Side::Long => {
                if bar_high > self.extreme_since_entry {
                    self.extreme_since_entry = bar_high;
                }
            }
            Side::Short => {
                if bar_low < self.extreme_since_entry {
                    self.extreme_since_entry = bar_low;
                }
            }
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == Side::Short
    }
}
