use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Local};
use good_lp::Expression;
use log::warn;

use crate::models::Tariff;
use crate::schedule::baseline::naive_schedule;
use crate::schedule::solver::{LpProblem, SolverStatus};

/// Result of a run of the LP scheduler: the schedule to use (the joint
/// optimum if the solver reported `optimal`, the naive baseline otherwise)
/// plus whether the LP actually solved, per spec.md §4.5/§7.
pub struct LpResult {
    pub schedule: Vec<f64>,
    pub status: SolverStatus,
}

/// Produces the joint-optimal EV schedule subject to the effective
/// subscription ceiling and the charging-window constraint (spec.md §4.5).
///
/// # Arguments
///
/// * 'n' - number of hours in the time grid
/// * 'timestamps' - local wall-clock instant for each hour
/// * 'fleet_power_cap_kw' - aggregate fleet charging power cap
/// * 'energy_need_kwh' - total energy the fleet must receive over the horizon
/// * 'window_hours' - hour-of-day indices (0..24) inside the charging window
/// * 'spot' - hourly spot price, minor-unit/kWh
/// * 'base_load' - hourly baseload draw, kW
/// * 'tariff' - tariff governing peak/capacity fees and peak-window detection
/// * 'subscription_kw' - the property's contractual ceiling
/// * 'safety_margin' - fractional reduction applied to the ceiling (spec.md §4.5, §4.7)
/// * 'lp_time_limit' - hard wall-clock budget handed to the solver
#[allow(clippy::too_many_arguments)]
pub fn lp_schedule(
    n: usize,
    timestamps: &[DateTime<Local>],
    fleet_power_cap_kw: f64,
    energy_need_kwh: f64,
    window_hours: &HashSet<u32>,
    spot: &[f64],
    base_load: &[f64],
    tariff: &Tariff,
    subscription_kw: f64,
    safety_margin: f64,
    lp_time_limit: Duration,
) -> LpResult {
    let s_eff = subscription_kw * (1.0 - safety_margin);

    let mut problem = LpProblem::new();

    let x: Vec<_> = (0..n)
        .map(|t| {
            let cap = if window_hours.contains(&((t as u32) % 24)) { fleet_power_cap_kw } else { 0.0 };
            problem.add_variable(cap)
        })
        .collect();
    // A large but finite bound: the billing peak can never exceed the
    // effective subscription ceiling, enforced by the per-hour constraints
    // below, so this only needs to be large enough not to bind itself.
    let peak_upper_bound = (subscription_kw + fleet_power_cap_kw).max(1.0) * 2.0;
    let m = problem.add_variable(peak_upper_bound);
    let p = problem.add_variable(peak_upper_bound);

    let energy_sum: Expression = x.iter().map(|v| Expression::from(*v)).sum();
    problem.add_ge_constraint(energy_sum, energy_need_kwh);

    for t in 0..n {
        problem.add_le_constraint(Expression::from(x[t]) + base_load[t], s_eff);
        problem.add_ge_constraint(Expression::from(m) - Expression::from(x[t]), base_load[t]);
        if tariff.is_peak(timestamps[t]) {
            problem.add_ge_constraint(Expression::from(p) - Expression::from(x[t]), base_load[t]);
        }
    }

    let objective: Expression = (0..n)
        .map(|t| {
            let fee = tariff.energy_fee(timestamps[t]);
            Expression::from(x[t]) * (spot[t] / 100.0 + fee)
        })
        .sum::<Expression>()
        + Expression::from(m) * tariff.capacity_fee_kw
        + Expression::from(p) * tariff.peak_fee_kw;

    let mut watch = x.clone();
    watch.push(m);
    watch.push(p);

    let (status, values) = problem.solve(objective, watch, lp_time_limit);

    match status {
        SolverStatus::Optimal => {
            let schedule = x.iter().map(|v| values.get(v).copied().unwrap_or(0.0).max(0.0)).collect();
            LpResult { schedule, status: SolverStatus::Optimal }
        }
        other => {
            warn!(
                "LP scheduler returned {:?}: E_need={:.1}, window_capacity={:.1}, S_eff={:.1}; falling back to naive schedule",
                other,
                energy_need_kwh,
                window_hours.len() as f64 * fleet_power_cap_kw,
                s_eff
            );
            let schedule = naive_schedule(n, fleet_power_cap_kw, energy_need_kwh, window_hours, spot);
            LpResult { schedule, status: other }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeakMethod;
    use chrono::{NaiveDate, TimeZone};

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

    #[test]
    fn feasible_problem_meets_energy_need_and_ceiling() {
        let n = 24;
        let timestamps: Vec<_> = (0..n).map(|h| Local.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap() + chrono::TimeDelta::hours(h as i64)).collect();
        let window: HashSet<u32> = (18..24).chain(0..8).collect();
        let spot = vec![80.0; n];
        let base_load = vec![40.0; n];

        let result = lp_schedule(
            n,
            &timestamps,
            88.0,
            462.0,
            &window,
            &spot,
            &base_load,
            &tariff(),
            150.0,
            0.0,
            Duration::from_secs(60),
        );

        assert_eq!(result.status, SolverStatus::Optimal);
        let total: f64 = result.schedule.iter().sum();
        assert!(total >= 462.0 - 1e-3);
        for (t, x) in result.schedule.iter().enumerate() {
            assert!(base_load[t] + x <= 150.0 + 1e-6);
        }
    }

    #[test]
    fn infeasible_problem_falls_back_to_naive() {
        let n = 10;
        let timestamps: Vec<_> = (0..n).map(|h| Local.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap() + chrono::TimeDelta::hours(h as i64)).collect();
        let window: HashSet<u32> = (0..10).collect();
        let spot = vec![80.0; n];
        let base_load = vec![45.0; n];

        // fleet cap * window hours = 440 * 10 = 4400, well above demand, but
        // the ceiling is far too small relative to base load to ever meet
        // E_need within the window.
        let result = lp_schedule(
            n,
            &timestamps,
            440.0,
            1155.0,
            &window,
            &spot,
            &base_load,
            &tariff(),
            50.0,
            0.0,
            Duration::from_secs(60),
        );

        assert_ne!(result.status, SolverStatus::Optimal);
        assert_eq!(result.schedule.len(), n);
    }
}
