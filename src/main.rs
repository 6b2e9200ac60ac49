use anyhow::{Context, Result};
use atrail::prelude::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atrail")]
#[command(about = "A trend-following backtest engine with fixed-at-entry trailing stops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //path to a json run configuration; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        //path to csv data file
        #[arg(long)]
        data: Option<PathBuf>,

        //output directory for trades.csv and equity.csv
        #[arg(long)]
        out: Option<PathBuf>,

        //initial account capital
        #[arg(long)]
        initial_capital: Option<f64>,

        //ema/trima length
        #[arg(long)]
        length: Option<usize>,

        //use an atr-based stop distance fixed at entry
        #[arg(long)]
        use_atr_stop: bool,

        //atr multiplier for the stop distance
        #[arg(long)]
        atr_multiplier: Option<f64>,

        //fallback fixed stop distance when atr is off or undefined
        #[arg(long)]
        fallback_stop: Option<f64>,
    },

    //write a default run configuration to a json file
    InitConfig {
        //destination path
        #[arg(long, default_value = "atrail.json")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            out,
            initial_capital,
            length,
            use_atr_stop,
            atr_multiplier,
            fallback_stop,
        } => {
            let config = build_configuration(
                config,
                data,
                out,
                initial_capital,
                length,
                use_atr_stop,
                atr_multiplier,
                fallback_stop,
            )?;
            run_backtest(config)?;
        }
        Commands::InitConfig { path } => {
            RunConfiguration::default().to_json_file(&path)?;
            println!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_configuration(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    out: Option<PathBuf>,
    initial_capital: Option<f64>,
    length: Option<usize>,
    use_atr_stop: bool,
    atr_multiplier: Option<f64>,
    fallback_stop: Option<f64>,
) -> Result<RunConfiguration> {
    let mut config = match &config_path {
        Some(path) => RunConfiguration::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        None => RunConfiguration::default(),
    };

    if config_path.is_none() && data.is_none() {
        anyhow::bail!("Either --config or --data is required");
    }

    if let Some(data) = data {
        config.data_path = data;
    }
    if let Some(out) = out {
        config.output_dir = out;
    }
    if let Some(initial_capital) = initial_capital {
        config.backtest.initial_capital = initial_capital;
    }
    if let Some(length) = length {
        config.signal.length = length;
    }
    if use_atr_stop {
        config.backtest.use_atr_stop = true;
    }
    if let Some(atr_multiplier) = atr_multiplier {
        config.backtest.atr_multiplier = atr_multiplier;
    }
    if let Some(fallback_stop) = fallback_stop {
        config.backtest.fallback_stop_distance = fallback_stop;
    }

    Ok(config)
}

fn run_backtest(config: RunConfiguration) -> Result<()> {
    println!("Atrail Trend Backtest Engine");
    println!("============================\n");

    //load data
    println!("Loading data from {:?}...", config.data_path);
    let bars = load_csv(&config.data_path)
        .context(format!("Failed to load data from {:?}", config.data_path))?;

    if bars.is_empty() {
        anyhow::bail!("No bars found in {:?}", config.data_path);
    }

    println!("Loaded {} bars", bars.len());
    println!(
        "Date range: {} to {}\n",
        bars.first().unwrap().timestamp,
        bars.last().unwrap().timestamp
    );

    let contract = config.contract.to_futures_contract();
    println!(
        "Contract: {} (multiplier: {}, tick: {}, cost/side: {})",
        contract.symbol, contract.multiplier, contract.tick_size, contract.cost_per_trade
    );

    //generate signals
    let annotated = generate_signals(&bars, &config.signal)?;
    let long_signals = annotated.iter().filter(|b| b.signal_long).count();
    let short_signals = annotated.iter().filter(|b| b.signal_short).count();
    println!(
        "Signals: {} long, {} short (length={}, atr stop: {})\n",
        long_signals,
        short_signals,
        config.signal.length,
        if config.backtest.use_atr_stop {
            "on"
        } else {
            "off"
        }
    );

    //run the simulation
    println!("Running backtest...\n");
    let params = config.backtest.to_params();
    let initial_capital = params.initial_capital;
    let engine = BacktestEngine::new(params, contract);
    let report = engine.run(&annotated)?;

    //display results
    println!("Backtest Results");
    println!("================\n");
    let summary = SummaryMetrics::from_backtest(&report, initial_capital);
    summary.pretty_print_table();

    //save artifacts
    std::fs::create_dir_all(&config.output_dir)
        .context(format!("Failed to create {:?}", config.output_dir))?;

    let trades_path = config.output_dir.join("trades.csv");
    save_trades_csv(&report.trades, &trades_path)?;
    println!("\nTrades saved to {:?}", trades_path);

    let equity_path = config.output_dir.join("equity.csv");
    save_equity_csv(&report.equity_curve, &equity_path)?;
    println!("Equity curve saved to {:?}", equity_path);

    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "entry_time,exit_time,entry_price,exit_price,side,reason,net_pnl,stop_distance"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            trade.entry_time.format("%Y-%m-%d %H:%M:%S"),
            trade.exit_time.format("%Y-%m-%d %H:%M:%S"),
            trade.entry_price,
            trade.exit_price,
            trade.side,
            trade.reason,
            trade.net_pnl,
            trade.stop_distance
        )?;
    }

    Ok(())
}

fn save_equity_csv(equity_curve: &[EquityPoint], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "timestamp,equity")?;

    for point in equity_curve {
        writeln!(
            file,
            "{},{}",
            point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            point.equity
        )?;
    }

    Ok(())
}
