use std::env;
use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};
use rayon::ThreadPoolBuilder;

use ev_fleet_optimizer::config::load_config;
use ev_fleet_optimizer::errors::SchedulingError;
use ev_fleet_optimizer::logging::setup_logger;
use ev_fleet_optimizer::price_source::errors::PriceSourceError;
use ev_fleet_optimizer::price_source::PriceSource;
use ev_fleet_optimizer::request::{OptionalSeries, SimulationRequest, SimulationRequestWire};
use ev_fleet_optimizer::{Simulator, SimulatorConfig};

mod macros;

/// Reads a simulation request from stdin, runs one optimization pass, and
/// prints the result as JSON on stdout. The HTTP façade, persistence layer
/// and nightly trigger glue that would normally front this binary are out of
/// scope here (spec.md §6); this entry point stands in for all three during
/// local runs and scripted batch use.
fn main() -> Result<()> {
    ThreadPoolBuilder::new().num_threads(4).build_global().context("failed to start worker thread pool")?;

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = load_config(&config_path).map_err(|e| SchedulingError(e.to_string()))?;

    setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout).map_err(|e| SchedulingError(e.to_string()))?;

    let mut input = String::new();
    io::stdin().read_to_string(&mut input).context("failed to read request from stdin")?;
    let wire: SimulationRequestWire = serde_json::from_str(&input).context("failed to parse simulation request")?;

    let request = match build_request(wire, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("request rejected: {e}");
            return Err(e.into());
        }
    };

    let simulator = Simulator::new(SimulatorConfig {
        lp_time_limit: Duration::from_secs(config.optimizer.lp_time_limit_secs),
        monte_carlo_trials: config.optimizer.monte_carlo_trials,
    });

    let response = simulator.run(request);
    info!("simulation finished: data_quality={:?}", response.data_quality);

    let json = serde_json::to_string_pretty(&response).context("failed to serialize simulation response")?;
    println!("{json}");

    Ok(())
}

/// Resolves the wire request into the internal form, pre-fetching real spot
/// prices from the upstream feed when the caller didn't supply them
/// (spec.md §6 "spot_prices: optional, pre-fetched").
fn build_request(wire: SimulationRequestWire, config: &ev_fleet_optimizer::config::Config) -> Result<SimulationRequest, SchedulingError> {
    let needs_prices = wire.spot_prices.is_none();
    let grid_area = wire.property.grid_area.clone();
    let period_start = wire.period_start;
    let period_end = wire.period_end;

    let mut request = SimulationRequest::from_wire(wire).map_err(|e| SchedulingError(e.to_string()))?;

    if needs_prices {
        let source = PriceSource::new(&config.price_source);
        let result = crate::retry!(|| source.fetch(&grid_area, period_start, period_end));
        match result {
            Ok(points) => request.spot_prices = OptionalSeries::Supplied(points),
            // ConfigError-class: a missing token or an unrecognized bidding zone
            // is a misconfiguration, not something the orchestrator can degrade
            // around (spec.md §7) — fail the operation upward.
            Err(e @ (PriceSourceError::AuthError(_) | PriceSourceError::UnknownZone(_))) => {
                return Err(SchedulingError(e.to_string()));
            }
            Err(e) => {
                info!("no price feed for {grid_area}, orchestrator will synthesize: {e}");
            }
        }
    }

    Ok(request)
}
