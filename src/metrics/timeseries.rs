use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

//a point in the equity curve, one per input bar
//equity is realized-only: initial capital plus the net pnl of every
//trade closed strictly before this bar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

//drawdown per point: equity minus the running peak (zero or negative)
pub fn drawdowns(curve: &[EquityPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(curve.len());
    let mut peak = f64::NEG_INFINITY;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
        out.push(point.equity - peak);
    }

    out
}

//largest peak-to-trough drop in currency units (most negative drawdown)
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    drawdowns(curve).into_iter().fold(0.0, f64::min)
}

//largest drawdown as a fraction of the peak it fell from
pub fn max_drawdown_pct(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            worst = worst.min((point.equity - peak) / peak);
        }
    }

    worst
}

//bar-over-bar simple returns
pub fn returns(curve: &[EquityPoint]) -> Vec<f64> {
    if curve.len() < 2 {
        return vec![];
    }

    let mut out = Vec::with_capacity(curve.len() - 1);
    for i in 1..curve.len() {
        let prev = curve[i - 1].equity;
        if prev != 0.0 {
            out.push((curve[i].equity - prev) / prev);
        } else {
            out.push(0.0);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: base + chrono::Duration::hours(i as i64),
                equity,
            })
            .collect()
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let c = curve(&[100.0, 120.0, 110.0, 130.0, 90.0]);
        let dd = drawdowns(&c);
        assert_eq!(dd, vec![0.0, 0.0, -10.0, 0.0, -40.0]);
        assert_eq!(max_drawdown(&c), -40.0);
    }

    #[test]
    fn max_drawdown_pct_relative_to_peak() {
        let c = curve(&[100.0, 200.0, 150.0]);
        assert!((max_drawdown_pct(&c) - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn returns_bar_over_bar() {
        let c = curve(&[100.0, 110.0, 99.0]);
        let r = returns(&c);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert!((r[1] - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn flat_curve_never_draws_down() {
        let c = curve(&[100.0; 5]);
        assert_eq!(max_drawdown(&c), 0.0);
        assert_eq!(max_drawdown_pct(&c), 0.0);
    }
}
