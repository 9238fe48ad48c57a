use std::collections::HashSet;

/// Produces a "naive" EV schedule (spec.md §4.4): charges in the cheapest
/// spot-price hours inside the wrap-aware availability window, ignoring the
/// capacity tariff entirely. Used as the Monte-Carlo/cost benchmark and as
/// the explicit fallback rung when the LP scheduler does not return `optimal`
/// (spec.md §4.5, §7).
///
/// Guaranteed feasible whenever the window has enough raw capacity
/// (`window_hours.len() * fleet_power_cap_kw >= energy_need_kwh`); otherwise
/// the returned schedule under-delivers energy and the caller (the
/// orchestrator) must notice via the `Σ x[t] >= E_need` invariant.
///
/// # Arguments
///
/// * 'n' - number of hours in the time grid
/// * 'fleet_power_cap_kw' - aggregate fleet charging power cap
/// * 'energy_need_kwh' - total energy the fleet must receive
/// * 'window_hours' - hour-of-day indices (0..24) inside the charging window
/// * 'spot' - hourly spot price, minor-unit/kWh, length `n`
pub fn naive_schedule(n: usize, fleet_power_cap_kw: f64, energy_need_kwh: f64, window_hours: &HashSet<u32>, spot: &[f64]) -> Vec<f64> {
    let mut schedule = vec![0.0; n];

    let mut candidates: Vec<usize> = (0..n).filter(|t| window_hours.contains(&((*t as u32) % 24))).collect();
    candidates.sort_by(|a, b| spot[*a].partial_cmp(&spot[*b]).unwrap());

    let mut remaining = energy_need_kwh;
    for t in candidates {
        if remaining <= 0.0 {
            break;
        }
        let assign = fleet_power_cap_kw.min(remaining);
        schedule[t] = assign;
        remaining -= assign;
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_cheapest_hours_first() {
        let window: HashSet<u32> = [0, 1, 2, 3].into_iter().collect();
        let spot = vec![50.0, 10.0, 30.0, 20.0];
        let schedule = naive_schedule(4, 100.0, 150.0, &window, &spot);
        // Cheapest is hour 1 (10.0), then hour 3 (20.0): together 200 kW
        // capacity but only 150 kWh needed, so hour 1 takes all of it.
        assert_eq!(schedule[1], 100.0);
        assert_eq!(schedule[3], 50.0);
        assert_eq!(schedule[0], 0.0);
        assert_eq!(schedule[2], 0.0);
    }

    #[test]
    fn zero_outside_window() {
        let window: HashSet<u32> = [0].into_iter().collect();
        let spot = vec![10.0, 5.0];
        let schedule = naive_schedule(2, 50.0, 10.0, &window, &spot);
        assert_eq!(schedule[1], 0.0);
    }

    #[test]
    fn underdelivers_when_window_too_small() {
        let window: HashSet<u32> = [0].into_iter().collect();
        let spot = vec![10.0];
        let schedule = naive_schedule(1, 10.0, 100.0, &window, &spot);
        assert_eq!(schedule.iter().sum::<f64>(), 10.0);
    }
}
