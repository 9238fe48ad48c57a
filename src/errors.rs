use std::fmt;
use std::fmt::Formatter;
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

use crate::price_source::errors::PriceSourceError;

/// Error depicting errors that occur while loading or validating configuration.
///
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for ConfigError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<log::SetLoggerError> for ConfigError {
    fn from(e: log::SetLoggerError) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}

/// Error depicting a genuinely unrecoverable failure while running a simulation.
///
/// Everything the degradation ladder in spec.md §7 can absorb (upstream price
/// failures, LP infeasibility, a mismatched optional series) is handled in-band
/// by the orchestrator and never becomes one of these; this type is reserved
/// for the boundary-validation failures spec.md §7 calls out as non-recoverable
/// (a config error reaching the core, or a zero-length time grid).
#[derive(Debug)]
pub struct SchedulingError(pub String);

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "SchedulingError: {}", self.0)
    }
}
impl std::error::Error for SchedulingError {}
impl From<&str> for SchedulingError {
    fn from(e: &str) -> Self {
        SchedulingError(e.to_string())
    }
}
impl From<String> for SchedulingError {
    fn from(e: String) -> Self {
        SchedulingError(e)
    }
}
impl From<PriceSourceError> for SchedulingError {
    fn from(e: PriceSourceError) -> Self {
        SchedulingError(e.to_string())
    }
}
impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for SchedulingError {
    fn from(e: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        SchedulingError(e.to_string())
    }
}
impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for SchedulingError {
    fn from(e: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        SchedulingError(e.to_string())
    }
}

/// Error depicting a simulation request that fails boundary validation
/// (spec.md §7, "Invalid request"). The only case that is rejected outright
/// rather than silently downgraded is a zero-length time grid.
#[derive(Debug)]
pub struct RequestError(pub String);

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "RequestError: {}", self.0)
    }
}
impl std::error::Error for RequestError {}
impl From<&str> for RequestError {
    fn from(e: &str) -> Self {
        RequestError(e.to_string())
    }
}
