use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

/// Method used to pick the billing peak out of a set of hourly kW samples.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakMethod {
    Single,
    Avg3,
    Avg5,
}

impl PeakMethod {
    /// Mean of the `k` largest elements of `values` (`k` = 1, 3 or 5 depending on
    /// variant), clamped to the set size. Returns 0 for an empty set.
    pub fn top_avg(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let k = match self {
            PeakMethod::Single => 1,
            PeakMethod::Avg3 => 3,
            PeakMethod::Avg5 => 5,
        }
        .min(values.len());

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());

        sorted[..k].iter().sum::<f64>() / k as f64
    }
}

/// Grid tariff in effect for a property.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tariff {
    pub operator_name: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub base_monthly_fee: f64,
    pub capacity_fee_kw: f64,
    pub peak_fee_kw: f64,
    pub peak_hour_start: u32,
    pub peak_hour_end: u32,
    pub peak_months: Vec<u32>,
    pub peak_weekdays_only: bool,
    pub peak_method: PeakMethod,
    pub energy_fee_peak: f64,
    pub energy_fee_offpeak: f64,
}

impl Tariff {
    /// Validates the invariants `spec.md` §3 places on a tariff record.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.peak_hour_start < self.peak_hour_end && self.peak_hour_end <= 24) {
            return Err(format!(
                "peak hour window [{}, {}) violates 0 <= start < end <= 24",
                self.peak_hour_start, self.peak_hour_end
            ));
        }
        let fees = [
            self.base_monthly_fee,
            self.capacity_fee_kw,
            self.peak_fee_kw,
            self.energy_fee_peak,
            self.energy_fee_offpeak,
        ];
        if fees.iter().any(|f| *f < 0.0) {
            return Err("tariff monetary fields must be non-negative".into());
        }
        Ok(())
    }

    /// `is_peak(dt)` from spec.md §4.1.
    pub fn is_peak(&self, dt: DateTime<Local>) -> bool {
        let month_ok = self.peak_months.contains(&dt.month());
        let weekday_ok = !self.peak_weekdays_only || dt.weekday().num_days_from_monday() < 5;
        let hour_ok = (self.peak_hour_start..self.peak_hour_end).contains(&dt.hour());
        month_ok && weekday_ok && hour_ok
    }

    /// Energy surcharge in effect for `dt`.
    pub fn energy_fee(&self, dt: DateTime<Local>) -> f64 {
        if self.is_peak(dt) {
            self.energy_fee_peak
        } else {
            self.energy_fee_offpeak
        }
    }
}

/// Grid-connection and subscription details for the property being optimized.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Property {
    pub grid_area: String,
    pub subscription_kw: f64,
    pub meter_id: Option<String>,
    pub property_id: Option<String>,
}

/// Aggregate EV fleet parameters (see spec.md §3).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Fleet {
    pub vehicle_count: u32,
    pub charger_kw: f64,
    pub battery_kwh: f64,
    pub arrival_soc: f64,
    pub arrival_hour: f64,
    pub departure_hour: f64,
}

impl Fleet {
    pub fn fleet_power_cap_kw(&self) -> f64 {
        self.vehicle_count as f64 * self.charger_kw
    }

    pub fn energy_need_kwh(&self) -> f64 {
        self.vehicle_count as f64 * self.battery_kwh * (1.0 - self.arrival_soc)
    }

    /// Set of hour-of-day indices (0..24) in the wrap-aware charging window `[a, d)`.
    pub fn window_hours(&self) -> Vec<u32> {
        let a = self.arrival_hour.floor() as u32 % 24;
        let d = self.departure_hour.floor() as u32 % 24;
        if a < d {
            (a..d).collect()
        } else if a > d {
            (a..24).chain(0..d).collect()
        } else {
            // a == d: a full-day window, charging is always permitted
            (0..24).collect()
        }
    }
}

/// Data-quality classification of the inputs an optimization run was fed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Ok,
    Partial,
    Fallback,
}

impl DataQuality {
    pub fn resolve(real_prices: bool, real_baseload: bool) -> DataQuality {
        match (real_prices, real_baseload) {
            (true, true) => DataQuality::Ok,
            (false, false) => DataQuality::Fallback,
            _ => DataQuality::Partial,
        }
    }

    /// The safety margin `spec.md` §4.7 attaches to each data-quality class.
    pub fn safety_margin(self) -> f64 {
        match self {
            DataQuality::Ok => 0.00,
            DataQuality::Partial => 0.05,
            DataQuality::Fallback => 0.10,
        }
    }
}

/// One hourly spot price sample, in minor-unit/kWh.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Local>,
    pub price_ore_kwh: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn top_avg_single_is_max() {
        assert_eq!(PeakMethod::Single.top_avg(&[1.0, 5.0, 3.0]), 5.0);
    }

    #[test]
    fn top_avg_empty_is_zero() {
        assert_eq!(PeakMethod::Avg3.top_avg(&[]), 0.0);
    }

    #[test]
    fn top_avg_clamps_to_set_size() {
        assert_eq!(PeakMethod::Avg5.top_avg(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn tariff_rejects_bad_window() {
        let mut t = tariff();
        t.peak_hour_end = 25;
        assert!(t.validate().is_err());
    }

    #[test]
    fn fleet_window_wraps_midnight() {
        let fleet = Fleet {
            vehicle_count: 8,
            charger_kw: 11.0,
            battery_kwh: 77.0,
            arrival_soc: 0.25,
            arrival_hour: 22.0,
            departure_hour: 6.0,
        };
        let hours: std::collections::HashSet<u32> = fleet.window_hours().into_iter().collect();
        let expected: std::collections::HashSet<u32> = [22, 23, 0, 1, 2, 3, 4, 5].into_iter().collect();
        assert_eq!(hours, expected);
    }

    #[test]
    fn fleet_energy_need() {
        let fleet = Fleet {
            vehicle_count: 8,
            charger_kw: 11.0,
            battery_kwh: 77.0,
            arrival_soc: 0.25,
            arrival_hour: 18.0,
            departure_hour: 8.0,
        };
        assert!((fleet.energy_need_kwh() - 462.0).abs() < 1e-6);
    }

    #[test]
    fn data_quality_resolution() {
        assert_eq!(DataQuality::resolve(true, true), DataQuality::Ok);
        assert_eq!(DataQuality::resolve(true, false), DataQuality::Partial);
        assert_eq!(DataQuality::resolve(false, true), DataQuality::Partial);
        assert_eq!(DataQuality::resolve(false, false), DataQuality::Fallback);
    }
}
