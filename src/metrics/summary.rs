use crate::engine::backtest::BacktestReport;
use crate::engine::execution::ExitReason;
use crate::metrics::timeseries::{max_drawdown, max_drawdown_pct};
use crate::portfolio::Side;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub net_profit: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_win_loss_ratio: f64,
    pub profit_factor: f64,
    pub long_pnl: f64,
    pub short_pnl: f64,
    pub trailing_stop_exits: usize,
    pub reversal_exits: usize,
    pub forced_exits: usize,
}

impl SummaryMetrics {
    //calculates summary metrics from a finished backtest
    //
    //final equity is taken from the ledger rather than the last curve
    //point: the curve is snapshotted before same-bar exits, so a trade
    //closing on the last bar is not yet in it
    pub fn from_backtest(report: &BacktestReport, initial_capital: f64) -> Self {
        let net_profit: f64 = report.trades.iter().map(|t| t.net_pnl).sum();
        let final_equity = initial_capital + net_profit;

        let total_return_pct = if initial_capital != 0.0 {
            net_profit / initial_capital
        } else {
            0.0
        };

        let wins: Vec<f64> = report
            .trades
            .iter()
            .filter(|t| t.is_winner())
            .map(|t| t.net_pnl)
            .collect();
        let losses: Vec<f64> = report
            .trades
            .iter()
            .filter(|t| !t.is_winner())
            .map(|t| t.net_pnl)
            .collect();

        let num_trades = report.trades.len();
        let num_winning_trades = wins.len();
        let num_losing_trades = losses.len();

        let win_rate = if num_trades > 0 {
            num_winning_trades as f64 / num_trades as f64
        } else {
            0.0
        };

        let avg_win = if wins.is_empty() { 0.0 } else { (&wins).mean() };
        let avg_loss = if losses.is_empty() {
            0.0
        } else {
            (&losses).mean().abs()
        };

        let avg_win_loss_ratio = if avg_loss > 0.0 { avg_win / avg_loss } else { 0.0 };

        let gross_profit: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let side_pnl = |side: Side| -> f64 {
            report
                .trades
                .iter()
                .filter(|t| t.side == side)
                .map(|t| t.net_pnl)
                .sum()
        };

        let exit_count = |reason: ExitReason| -> usize {
            report.trades.iter().filter(|t| t.reason == reason).count()
        };

        SummaryMetrics {
            initial_capital,
            final_equity,
            net_profit,
            total_return_pct,
            max_drawdown: max_drawdown(&report.equity_curve),
            max_drawdown_pct: max_drawdown_pct(&report.equity_curve),
            num_trades,
            num_winning_trades,
            num_losing_trades,
            win_rate,
            avg_win,
            avg_loss,
            avg_win_loss_ratio,
            profit_factor,
            long_pnl: side_pnl(Side::Long),
            short_pnl: side_pnl(Side::Short),
            trailing_stop_exits: exit_count(ExitReason::TrailingStop),
            reversal_exits: exit_count(ExitReason::Reversal),
            forced_exits: exit_count(ExitReason::ForcedExit),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Capital"),
            Cell::new(&format!("{:.0}", self.initial_capital)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Equity"),
            Cell::new(&format!("{:.0}", self.final_equity)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Net Profit"),
            Cell::new(&format!(
                "{:.0} ({:.2}%)",
                self.net_profit,
                self.total_return_pct * 100.0
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!(
                "{:.0} ({:.2}%)",
                self.max_drawdown,
                self.max_drawdown_pct * 100.0
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Number of Trades"),
            Cell::new(&format!("{}", self.num_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.2}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win"),
            Cell::new(&format!("{:.0}", self.avg_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Loss"),
            Cell::new(&format!("{:.0}", self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win/Loss"),
            Cell::new(&format!("{:.2}", self.avg_win_loss_ratio)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Factor"),
            Cell::new(&format!("{:.3}", self.profit_factor)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Long PnL"),
            Cell::new(&format!("{:.0}", self.long_pnl)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Short PnL"),
            Cell::new(&format!("{:.0}", self.short_pnl)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Exits (trail/reversal/forced)"),
            Cell::new(&format!(
                "{}/{}/{}",
                self.trailing_stop_exits, self.reversal_exits, self.forced_exits
            )),
        ]));

        table.printstd();
    }
}
