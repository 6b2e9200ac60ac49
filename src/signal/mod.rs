pub mod indicators;

use crate::data::Bar;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Not enough bars to generate signals: need at least {required}, got {actual}")]
    NotEnoughBars { required: usize, actual: usize },
}

//signal generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    //ema/trima length
    pub length: usize,

    //atr window
    pub atr_window: usize,

    //regime sma window gating short entries
    pub regime_window: usize,

    //lower bound for the 1- and 2-bar momentum filters on long entries
    pub momentum_floor: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            length: 21,
            atr_window: 14,
            regime_window: 200,
            momentum_floor: -0.25,
        }
    }
}

//one bar annotated by the signal provider, ready for the engine
//signal flags are confirmed on the previous bar's close and refer to
//action at this bar's open; atr_prev is the previous bar's atr
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub atr_prev: Option<f64>,
    pub signal_long: bool,
    pub signal_short: bool,
}

//computes indicators and entry signals over a chronological bar series
//
//long cross: ema crosses above trima with both momentum filters above
//the floor; short cross: ema crosses below trima with close under the
//regime sma; both are then shifted one bar forward so the engine acts
//on the next open
pub fn generate_signals(bars: &[Bar], params: &SignalParams) -> Result<Vec<SignalBar>, SignalError> {
    if bars.len() < 2 {
        return Err(SignalError::NotEnoughBars {
            required: 2,
            actual: bars.len(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let xma = indicators::ema(&closes, params.length);
    let trima = indicators::trima(&closes, params.length);
    let regime = indicators::sma(&closes, params.regime_window);
    let atr = indicators::atr(bars, params.atr_window);
    let mom_1 = indicators::momentum(&closes, 1);
    let mom_2 = indicators::momentum(&closes, 2);

    //cross flags on the bar where the cross completes
    let mut cross_up = vec![false; bars.len()];
    let mut cross_down = vec![false; bars.len()];

    for i in 1..bars.len() {
        let (Some(trima_now), Some(trima_prev)) = (trima[i], trima[i - 1]) else {
            continue;
        };

        let crossed_up = xma[i] > trima_now && xma[i - 1] <= trima_prev;
        let crossed_down = xma[i] < trima_now && xma[i - 1] >= trima_prev;

        if crossed_up {
            let momentum_ok = matches!(mom_1[i], Some(m) if m > params.momentum_floor)
                && matches!(mom_2[i], Some(m) if m > params.momentum_floor);
            cross_up[i] = momentum_ok;
        }

        if crossed_down {
            let regime_ok = matches!(regime[i], Some(r) if closes[i] < r);
            cross_down[i] = regime_ok;
        }
    }

    //shift: signal decided on close of i - 1 executes at open of i
    let annotated = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| SignalBar {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            atr_prev: if i > 0 { atr[i - 1] } else { None },
            signal_long: i > 0 && cross_up[i - 1],
            signal_short: i > 0 && cross_down[i - 1],
        })
        .collect();

    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Bar::new_unchecked(
                    base + chrono::Duration::hours(i as i64),
                    close,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    fn small_params() -> SignalParams {
        SignalParams {
            length: 3,
            atr_window: 2,
            regime_window: 4,
            momentum_floor: -0.25,
        }
    }

    #[test]
    fn too_few_bars_is_an_error() {
        let bars = make_bars(&[100.0]);
        assert!(matches!(
            generate_signals(&bars, &small_params()),
            Err(SignalError::NotEnoughBars { .. })
        ));
    }

    #[test]
    fn signals_are_shifted_one_bar() {
        //falling then sharply rising closes force an upward ema/trima cross
        let closes = [110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 120.0, 140.0, 160.0, 180.0];
        let bars = make_bars(&closes);
        let annotated = generate_signals(&bars, &small_params()).unwrap();

        let cross_bar = annotated
            .iter()
            .position(|sb| sb.signal_long)
            .expect("expected a long signal");

        //the signal bar itself acts at its open; the cross completed on the
        //previous close, which must have ema above trima
        assert!(cross_bar > 0);
        let closes_so_far: Vec<f64> = closes[..cross_bar].to_vec();
        let xma = indicators::ema(&closes_so_far, 3);
        let trima = indicators::trima(&closes_so_far, 3);
        let last = closes_so_far.len() - 1;
        assert!(xma[last] > trima[last].unwrap());
    }

    #[test]
    fn first_bar_never_signals() {
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let annotated = generate_signals(&bars, &small_params()).unwrap();
        assert!(!annotated[0].signal_long);
        assert!(!annotated[0].signal_short);
        assert_eq!(annotated[0].atr_prev, None);
    }

    #[test]
    fn long_and_short_never_coincide() {
        //noisy series exercising both cross directions
        let closes = [
            100.0, 104.0, 96.0, 108.0, 92.0, 110.0, 90.0, 112.0, 88.0, 114.0, 86.0, 116.0, 84.0,
            118.0, 82.0, 120.0,
        ];
        let bars = make_bars(&closes);
        let annotated = generate_signals(&bars, &small_params()).unwrap();
        for sb in &annotated {
            assert!(!(sb.signal_long && sb.signal_short));
        }
    }

    #[test]
    fn atr_prev_lags_by_one_bar() {
        let closes: Vec<f64> = (0..8).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let params = small_params();
        let annotated = generate_signals(&bars, &params).unwrap();
        let atr = indicators::atr(&bars, params.atr_window);

        for i in 1..annotated.len() {
            assert_eq!(annotated[i].atr_prev, atr[i - 1]);
        }
    }
}
