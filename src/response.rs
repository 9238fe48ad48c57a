use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::monte_carlo::MonteCarloReport;
use crate::models::DataQuality;

/// One hour of the per-hour result series (spec.md §6 `hourly_data`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HourlyRecord {
    pub timestamp: DateTime<Local>,
    pub base_kw: f64,
    pub ev_kw_without: f64,
    pub ev_kw_with: f64,
    pub total_kw_without: f64,
    pub total_kw_with: f64,
    pub spot_price: f64,
    pub is_peak_hour: bool,
}

/// Itemized cost breakdown, with-and-without optimization (spec.md §6).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResponseBreakdown {
    pub spot_cost_without: f64,
    pub spot_cost_with: f64,
    pub capacity_cost_without: f64,
    pub capacity_cost_with: f64,
    pub peak_cost_without: f64,
    pub peak_cost_with: f64,
    pub base_monthly_fee: f64,
}

/// The simulation response boundary schema (spec.md §6).
#[derive(Clone, Debug, Serialize)]
pub struct SimulationResponse {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub cost_without: f64,
    pub cost_with: f64,
    pub savings_total: f64,
    pub savings_pct: f64,
    pub peak_kw_without: f64,
    pub peak_kw_with: f64,
    pub monte_carlo: MonteCarloReport,
    pub breakdown: ResponseBreakdown,
    pub hourly_data: Vec<HourlyRecord>,
    pub worst_days_avoided: Vec<String>,
    pub data_quality: DataQuality,
}
