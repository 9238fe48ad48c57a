use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::Tariff;
use crate::tariff::split_peak_hours;

/// Itemized cost breakdown produced by the cost model (spec.md §4.2, §6).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Breakdown {
    pub spot_cost: f64,
    pub capacity_cost: f64,
    pub peak_cost: f64,
    pub base_monthly_fee: f64,
}

impl Breakdown {
    pub fn total(&self) -> f64 {
        round2(self.spot_cost + self.capacity_cost + self.peak_cost + self.base_monthly_fee)
    }
}

/// Peak-draw statistics (spec.md §4.2): the billing peak over all hours and
/// the billing peak restricted to the tariff's peak window, each computed
/// under the tariff's configured `top_avg` method.
pub struct PeakStats {
    pub p_max_all: f64,
    pub p_max_peak: f64,
}

pub fn peak_stats(tariff: &Tariff, timestamps: &[DateTime<Local>], total_kw: &[f64]) -> PeakStats {
    let (peak_kw, all_kw) = split_peak_hours(tariff, timestamps, total_kw);
    PeakStats {
        p_max_all: tariff.peak_method.top_avg(&all_kw),
        p_max_peak: tariff.peak_method.top_avg(&peak_kw),
    }
}

/// Number of monthly base fees to charge over a date span (spec.md §4.2:
/// `months = max(1, round(Δdays/30))`).
pub fn months_in_span(days: i64) -> i64 {
    (days as f64 / 30.0).round().max(1.0) as i64
}

/// Computes the full cost breakdown for a given hourly total-draw series
/// (spec.md §4.2). `spot` is in minor-unit/kWh, `total_kw` in kW, both the
/// same length as `timestamps`.
pub fn compute_cost(
    tariff: &Tariff,
    timestamps: &[DateTime<Local>],
    total_kw: &[f64],
    spot: &[f64],
    months: i64,
) -> Breakdown {
    let spot_cost: f64 = timestamps
        .iter()
        .zip(total_kw.iter())
        .zip(spot.iter())
        .map(|((t, kw), price)| kw * (price / 100.0 + tariff.energy_fee(*t)))
        .sum();

    let stats = peak_stats(tariff, timestamps, total_kw);
    let capacity_cost = stats.p_max_all * tariff.capacity_fee_kw;
    let peak_cost = stats.p_max_peak * tariff.peak_fee_kw;
    let base_monthly_fee = tariff.base_monthly_fee * months as f64;

    Breakdown {
        spot_cost: round2(spot_cost),
        capacity_cost: round2(capacity_cost),
        peak_cost: round2(peak_cost),
        base_monthly_fee: round2(base_monthly_fee),
    }
}

/// `savings_pct` as defined in spec.md §4.7/§8/§9 open question 4: zero
/// whenever the denominator is not strictly positive, never negative or
/// infinite.
pub fn savings_pct(cost_without: f64, savings_total: f64) -> f64 {
    if cost_without <= 0.0 {
        0.0
    } else {
        round2(100.0 * savings_total / cost_without)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
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
    fn empty_peak_hours_yield_zero_peak_cost() {
        let t = tariff();
        // Every timestamp is a Saturday in July: never a peak hour.
        let timestamps: Vec<_> = (0..24)
            .map(|h| Local.with_ymd_and_hms(2025, 7, 12, h, 0, 0).unwrap())
            .collect();
        let total_kw = vec![50.0; 24];
        let stats = peak_stats(&t, &timestamps, &total_kw);
        assert_eq!(stats.p_max_peak, 0.0);
    }

    #[test]
    fn months_in_span_floors_to_one() {
        assert_eq!(months_in_span(1), 1); // 1/30 rounds to 0, clamped to 1
        assert_eq!(months_in_span(0), 1);
        assert_eq!(months_in_span(30), 1);
        assert_eq!(months_in_span(45), 2);
    }

    #[test]
    fn savings_pct_zero_denominator() {
        assert_eq!(savings_pct(0.0, 0.0), 0.0);
        assert_eq!(savings_pct(-5.0, 3.0), 0.0);
    }

    #[test]
    fn savings_pct_normal_case() {
        assert_eq!(savings_pct(200.0, 50.0), 25.0);
    }
}
