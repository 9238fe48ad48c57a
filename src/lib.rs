pub mod cache;
pub mod config;
pub mod cost;
pub mod errors;
pub mod logging;
pub mod models;
pub mod monte_carlo;
pub mod price_source;
pub mod request;
pub mod response;
pub mod schedule;
pub mod simulator;
pub mod synthetic;
pub mod tariff;

pub use request::{OptionalSeries, SimulationRequest, SimulationRequestWire};
pub use response::SimulationResponse;
pub use simulator::{Simulator, SimulatorConfig};
