use std::fs;

use log::LevelFilter;
use serde::Deserialize;

use crate::errors::ConfigError;

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct PriceSourceConfig {
    pub api_token: String,
    pub base_url: String,
    pub high_price_bound_ore: f64,
    pub fallback_price_ore: f64,
}

#[derive(Deserialize)]
pub struct OptimizerConfig {
    pub lp_time_limit_secs: u64,
    pub monte_carlo_trials: usize,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub price_source: PriceSourceConfig,
    pub optimizer: OptimizerConfig,
}

/// Loads the configuration file and returns a struct with all configuration items.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}
