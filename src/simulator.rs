use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike};
use log::info;

use crate::cache::{LastKnownGood, LastKnownGoodCache};
use crate::cost::{compute_cost, months_in_span, peak_stats, savings_pct};
use crate::models::{DataQuality, PricePoint};
use crate::monte_carlo::run_monte_carlo;
use crate::request::SimulationRequest;
use crate::response::{HourlyRecord, ResponseBreakdown, SimulationResponse};
use crate::schedule::baseline::naive_schedule;
use crate::schedule::lp::lp_schedule;
use crate::synthetic::{synthetic_baseload, synthetic_prices};

pub struct SimulatorConfig {
    pub lp_time_limit: Duration,
    pub monte_carlo_trials: usize,
}

/// The simulation orchestrator (spec.md §4.7): resolves data quality, selects
/// the safety margin, runs the schedulers, computes costs, maintains the
/// last-known-good cache, and assembles the result.
pub struct Simulator {
    config: SimulatorConfig,
    last_known_good: LastKnownGoodCache,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Simulator {
            config,
            last_known_good: LastKnownGoodCache::new(),
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.last_known_good.reset();
    }

    pub fn run(&self, request: SimulationRequest) -> SimulationResponse {
        let timestamps = hourly_grid(request.period_start, request.period_end);
        let n = timestamps.len();
        let days = (request.period_end - request.period_start).num_days();
        let months = months_in_span(days);

        let (base_load, real_baseload) = resolve_baseload(request.base_load_profile, n, &timestamps, request.property.subscription_kw);
        let (spot, real_prices) = resolve_prices(request.spot_prices, n, &timestamps);

        let data_quality = DataQuality::resolve(real_prices, real_baseload);
        let safety_margin = data_quality.safety_margin();

        let fleet_power_cap_kw = request.fleet.fleet_power_cap_kw();
        let energy_need_kwh = request.fleet.energy_need_kwh();
        let window_hours: std::collections::HashSet<u32> = request.fleet.window_hours().into_iter().collect();

        let naive = naive_schedule(n, fleet_power_cap_kw, energy_need_kwh, &window_hours, &spot);
        let lp_result = lp_schedule(
            n,
            &timestamps,
            fleet_power_cap_kw,
            energy_need_kwh,
            &window_hours,
            &spot,
            &base_load,
            &request.tariff,
            request.property.subscription_kw,
            safety_margin,
            self.config.lp_time_limit,
        );

        if data_quality == DataQuality::Ok {
            if let Some(property_id) = &request.property.property_id {
                self.last_known_good.put(
                    property_id,
                    LastKnownGood {
                        saved_at: Local::now(),
                        ev_schedule: lp_result.schedule.clone(),
                        price_series: spot.clone(),
                    },
                );
            }
        }

        let total_without: Vec<f64> = (0..n).map(|t| base_load[t] + naive[t]).collect();
        let total_with: Vec<f64> = (0..n).map(|t| base_load[t] + lp_result.schedule[t]).collect();

        let breakdown_without = compute_cost(&request.tariff, &timestamps, &total_without, &spot, months);
        let breakdown_with = compute_cost(&request.tariff, &timestamps, &total_with, &spot, months);

        let cost_without = breakdown_without.total();
        let cost_with = breakdown_with.total();
        let savings_total = round2(cost_without - cost_with);
        let savings_pct = savings_pct(cost_without, savings_total);

        let stats_without = peak_stats(&request.tariff, &timestamps, &total_without);
        let stats_with = peak_stats(&request.tariff, &timestamps, &total_with);

        let monte_carlo = run_monte_carlo(
            self.config.monte_carlo_trials,
            n,
            &timestamps,
            fleet_power_cap_kw,
            energy_need_kwh,
            request.fleet.arrival_hour,
            request.fleet.departure_hour,
            &spot,
            &base_load,
            &request.tariff,
            request.property.subscription_kw,
            safety_margin,
            self.config.lp_time_limit,
        );

        let hourly_data = build_hourly_data(&timestamps, &base_load, &naive, &lp_result.schedule, &spot, &total_without, &total_with, &request.tariff);
        let worst_days_avoided = worst_days(&timestamps, &naive, &lp_result.schedule);

        info!(
            "simulation complete: data_quality={:?}, cost_without={:.2}, cost_with={:.2}, savings={:.2}",
            data_quality, cost_without, cost_with, savings_total
        );

        SimulationResponse {
            period_start: request.period_start,
            period_end: request.period_end,
            cost_without,
            cost_with,
            savings_total,
            savings_pct,
            peak_kw_without: round2(stats_without.p_max_all),
            peak_kw_with: round2(stats_with.p_max_all),
            monte_carlo,
            breakdown: ResponseBreakdown {
                spot_cost_without: breakdown_without.spot_cost,
                spot_cost_with: breakdown_with.spot_cost,
                capacity_cost_without: breakdown_without.capacity_cost,
                capacity_cost_with: breakdown_with.capacity_cost,
                peak_cost_without: breakdown_without.peak_cost,
                peak_cost_with: breakdown_with.peak_cost,
                base_monthly_fee: breakdown_with.base_monthly_fee,
            },
            hourly_data,
            worst_days_avoided,
            data_quality,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the inclusive hourly local-time grid for `[period_start, period_end]`.
fn hourly_grid(period_start: NaiveDate, period_end: NaiveDate) -> Vec<DateTime<Local>> {
    let start = Local.from_local_datetime(&period_start.and_hms_opt(0, 0, 0).unwrap()).unwrap();
    let days = (period_end - period_start).num_days();
    let n = 24 * (days + 1);
    (0..n).map(|h| start + chrono::TimeDelta::hours(h)).collect()
}

fn resolve_baseload(
    supplied: crate::request::OptionalSeries<f64>,
    n: usize,
    timestamps: &[DateTime<Local>],
    subscription_kw: f64,
) -> (Vec<f64>, bool) {
    let (resolved, real) = supplied.resolve(n);
    match resolved {
        Some(series) => (series, real),
        None => {
            let hour_of_day: Vec<u32> = timestamps.iter().map(|t| t.hour()).collect();
            (synthetic_baseload(n, &hour_of_day, subscription_kw), false)
        }
    }
}

fn resolve_prices(supplied: crate::request::OptionalSeries<PricePoint>, n: usize, timestamps: &[DateTime<Local>]) -> (Vec<f64>, bool) {
    let (resolved, real) = supplied.resolve(n);
    match resolved {
        Some(series) => (series.into_iter().map(|p| p.price_ore_kwh).collect(), real),
        None => {
            let hour_of_day: Vec<u32> = timestamps.iter().map(|t| t.hour()).collect();
            (synthetic_prices(n, &hour_of_day), false)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_hourly_data(
    timestamps: &[DateTime<Local>],
    base_load: &[f64],
    naive: &[f64],
    lp: &[f64],
    spot: &[f64],
    total_without: &[f64],
    total_with: &[f64],
    tariff: &crate::models::Tariff,
) -> Vec<HourlyRecord> {
    (0..timestamps.len())
        .map(|t| HourlyRecord {
            timestamp: timestamps[t],
            base_kw: base_load[t],
            ev_kw_without: naive[t],
            ev_kw_with: lp[t],
            total_kw_without: total_without[t],
            total_kw_with: total_with[t],
            spot_price: spot[t],
            is_peak_hour: tariff.is_peak(timestamps[t]),
        })
        .collect()
}

/// Top-5 days with the largest naive-minus-LP daily total-kWh gap ("worst
/// days averted", spec.md §4.7 step 8).
fn worst_days(timestamps: &[DateTime<Local>], naive: &[f64], lp: &[f64]) -> Vec<String> {
    use std::collections::BTreeMap;

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in 0..timestamps.len() {
        let day = timestamps[t].date_naive();
        *by_day.entry(day).or_insert(0.0) += naive[t] - lp[t];
    }

    let mut days: Vec<(NaiveDate, f64)> = by_day.into_iter().collect();
    days.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    days.truncate(5);

    days.into_iter().map(|(d, _)| d.format("%Y-%m-%d").to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fleet, PeakMethod, Property, Tariff};
    use crate::request::{OptionalSeries, SimulationRequest};
    use chrono::NaiveDate;

    fn tariff() -> Tariff {
        Tariff {
            operator_name: "Test Grid AB".into(),
            valid_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            base_monthly_fee: 365.0,
            capacity_fee_kw: 59.0,
            peak_fee_kw: 70.0,
            peak_hour_start: 6,
            peak_hour_end: 22,
            peak_months: vec![11, 12, 1, 2, 3],
            peak_weekdays_only: true,
            peak_method: PeakMethod::Single,
            energy_fee_peak: 0.071,
            energy_fee_offpeak: 0.038,
        }
    }

    fn fleet() -> Fleet {
        Fleet {
            vehicle_count: 8,
            charger_kw: 11.0,
            battery_kwh: 77.0,
            arrival_soc: 0.25,
            arrival_hour: 18.0,
            departure_hour: 8.0,
        }
    }

    fn property() -> Property {
        Property {
            grid_area: "SE3".into(),
            subscription_kw: 150.0,
            meter_id: None,
            property_id: Some("prop-1".into()),
        }
    }

    fn request_for(day: NaiveDate, base_load: Option<Vec<f64>>, prices: Option<Vec<PricePoint>>) -> SimulationRequest {
        SimulationRequest {
            property: property(),
            fleet: fleet(),
            tariff: tariff(),
            period_start: day,
            period_end: day,
            base_load_profile: base_load.map(OptionalSeries::Supplied).unwrap_or(OptionalSeries::Absent),
            spot_prices: prices.map(OptionalSeries::Supplied).unwrap_or(OptionalSeries::Absent),
        }
    }

    fn simulator() -> Simulator {
        Simulator::new(SimulatorConfig {
            lp_time_limit: Duration::from_secs(60),
            monte_carlo_trials: 20,
        })
    }

    #[test]
    fn nominal_day_is_ok_quality_and_saves_money() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let timestamps = hourly_grid(day, day);
        let prices: Vec<PricePoint> = timestamps.iter().map(|t| PricePoint { timestamp: *t, price_ore_kwh: 80.0 }).collect();
        let base_load = vec![40.0; 24];

        let sim = simulator();
        let response = sim.run(request_for(day, Some(base_load), Some(prices)));

        assert_eq!(response.data_quality, DataQuality::Ok);
        assert!(response.peak_kw_with <= 150.0 + 1e-6);
        let ev_total: f64 = response.hourly_data.iter().map(|h| h.ev_kw_with).sum();
        assert!(ev_total >= 462.0 - 1e-3);
    }

    #[test]
    fn missing_prices_is_partial_quality_with_tighter_ceiling() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let base_load = vec![40.0; 24];

        let sim = simulator();
        let response = sim.run(request_for(day, Some(base_load), None));

        assert_eq!(response.data_quality, DataQuality::Partial);
        assert!(response.peak_kw_with <= 142.5 + 1e-6);
    }

    #[test]
    fn missing_both_is_fallback_quality_with_tightest_ceiling() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();

        let sim = simulator();
        let response = sim.run(request_for(day, None, None));

        assert_eq!(response.data_quality, DataQuality::Fallback);
        assert!(response.peak_kw_with <= 135.0 + 1e-6);
    }

    #[test]
    fn zero_cost_without_gives_zero_savings_pct() {
        assert_eq!(savings_pct(0.0, 0.0), 0.0);
    }
}
