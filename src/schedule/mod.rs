pub mod baseline;
pub mod lp;
pub mod solver;

/// An hourly EV charging schedule: `0 <= x[t] <= fleet_power_cap_kw`, zero
/// outside the charging window (spec.md §3).
pub type Schedule = Vec<f64>;
