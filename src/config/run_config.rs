use crate::engine::BacktestParams;
use crate::instrument::FuturesContract;
use crate::signal::SignalParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//contract configuration (simpler than the full futures contract)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub symbol: String,
    pub multiplier: f64,
    pub tick_size: f64,
    pub cost_per_trade: f64,
    pub settlement_hour: u32,
}

impl ContractConfig {
    //converts to a FuturesContract
    pub fn to_futures_contract(&self) -> FuturesContract {
        FuturesContract::new(
            self.symbol.clone(),
            self.multiplier,
            self.tick_size,
            self.cost_per_trade,
            self.settlement_hour,
        )
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        let txf = FuturesContract::txf();
        ContractConfig {
            symbol: txf.symbol,
            multiplier: txf.multiplier,
            tick_size: txf.tick_size,
            cost_per_trade: txf.cost_per_trade,
            settlement_hour: txf.settlement_hour,
        }
    }
}

//serializable backtest parameters, mirrors engine::BacktestParams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub fallback_stop_distance: f64,
    pub use_atr_stop: bool,
    pub atr_multiplier: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        let params = BacktestParams::default();
        BacktestConfig {
            initial_capital: params.initial_capital,
            fallback_stop_distance: params.fallback_stop_distance,
            use_atr_stop: params.use_atr_stop,
            atr_multiplier: params.atr_multiplier,
        }
    }
}

impl BacktestConfig {
    pub fn to_params(&self) -> BacktestParams {
        BacktestParams {
            initial_capital: self.initial_capital,
            fallback_stop_distance: self.fallback_stop_distance,
            use_atr_stop: self.use_atr_stop,
            atr_multiplier: self.atr_multiplier,
        }
    }
}

//complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    //data
    pub data_path: PathBuf,
    pub output_dir: PathBuf,

    //contract specification
    pub contract: ContractConfig,

    //signal generation
    pub signal: SignalParams,

    //simulation
    pub backtest: BacktestConfig,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            data_path: PathBuf::from("data.csv"),
            output_dir: PathBuf::from("outputs"),
            contract: ContractConfig::default(),
            signal: SignalParams::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
