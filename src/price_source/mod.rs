pub mod errors;
pub mod xml;
pub mod zones;

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use log::{debug, info, warn};

use crate::cache::PriceCache;
use crate::config::PriceSourceConfig;
use crate::models::PricePoint;
use crate::price_source::errors::PriceSourceError;
use crate::price_source::xml::{parse_points, RawPoint};
use crate::price_source::zones::zone_to_eic;

/// Fixed offset applied when converting the upstream UTC timestamps to local
/// wall-clock time. spec.md §9 open question 1 flags this as wrong across
/// DST transitions; see DESIGN.md for why it is kept as-is here.
const LOCAL_OFFSET_HOURS: i64 = 1;

const HIGH_PRICE_LOG_BOUND_DEFAULT: f64 = 800.0;

/// SEK per EUR used to convert EUR/MWh into minor-units/kWh (spec.md §4.3 step 5).
const EUR_SEK: f64 = 11.3;

pub struct PriceSource {
    agent: ureq::Agent,
    base_url: String,
    api_token: String,
    high_price_bound_ore: f64,
    fallback_price_ore: f64,
    cache: PriceCache,
}

impl PriceSource {
    pub fn new(config: &PriceSourceConfig) -> PriceSource {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .into();

        PriceSource {
            agent,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            high_price_bound_ore: if config.high_price_bound_ore > 0.0 {
                config.high_price_bound_ore
            } else {
                HIGH_PRICE_LOG_BOUND_DEFAULT
            },
            fallback_price_ore: config.fallback_price_ore,
            cache: PriceCache::new(),
        }
    }

    /// `fetch(area, start, end, token) -> sequence[{ts,price}]` from spec.md §4.3.
    /// Never returns an empty series and never blows up under upstream failure;
    /// the only errors that propagate are configuration errors (unknown zone,
    /// auth failure), matching the taxonomy in spec.md §7.
    ///
    /// # Arguments
    ///
    /// * 'area' - bidding zone code, e.g. `SE3`
    /// * 'start' - first delivery day to fetch (inclusive)
    /// * 'end' - last delivery day to fetch (inclusive)
    pub fn fetch(&self, area: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>, PriceSourceError> {
        let eic = zone_to_eic(area)?;

        let start_utc = local_midnight_utc(start);
        let end_utc = local_midnight_utc(end) + chrono::TimeDelta::days(1);

        if let Some(cached) = self.cache.get(area, start_utc, end_utc) {
            debug!("price cache hit for {area} [{start_utc}, {end_utc})");
            return Ok(cached);
        }

        match self.fetch_upstream(eic, start, end, start_utc, end_utc) {
            Ok(points) if !points.is_empty() => {
                self.cache.put(area, start_utc, end_utc, points.clone());
                Ok(points)
            }
            Ok(_) => {
                warn!("price feed returned zero points for {area}, falling back");
                Ok(self.fallback_prices(start, end))
            }
            Err(PriceSourceError::AuthError(msg)) => Err(PriceSourceError::AuthError(msg)),
            Err(e) => {
                warn!("price feed unavailable for {area}: {e}, falling back");
                Ok(self.fallback_prices(start, end))
            }
        }
    }

    fn fetch_upstream(
        &self,
        eic: &str,
        start: NaiveDate,
        end: NaiveDate,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, PriceSourceError> {
        let period_start = format!("{}0000", start.format("%Y%m%d"));
        let period_end = format!("{}2300", end.format("%Y%m%d"));

        let mut response = self
            .agent
            .get(&self.base_url)
            .query("securityToken", &self.api_token)
            .query("documentType", "A44")
            .query("in_Domain", eic)
            .query("out_Domain", eic)
            .query("periodStart", &period_start)
            .query("periodEnd", &period_end)
            .call()?;

        let xml = response.body_mut().read_to_string()?;
        let raw_points = parse_points(&xml)?;

        Ok(self.process_points(raw_points, start_utc, end_utc))
    }

    /// Converts raw UTC points into local-hour `PricePoint`s: coalesces
    /// sub-hourly points by running mean, converts EUR/MWh to minor-unit/kWh,
    /// clamps negatives to zero (logging at debug), logs extreme values at
    /// warn without dropping them, then sorts and dedups (spec.md §4.3 steps
    /// 6-8).
    fn process_points(&self, raw_points: Vec<RawPoint>, start_utc: DateTime<Utc>, end_utc: DateTime<Utc>) -> Vec<PricePoint> {
        let mut by_hour: Vec<(DateTime<Local>, f64)> = Vec::new();

        for raw in raw_points {
            if raw.instant_utc < start_utc || raw.instant_utc >= end_utc {
                continue;
            }
            let local_hour = to_local_hour(raw.instant_utc);
            let ore_per_kwh = eur_mwh_to_ore_kwh(raw.eur_per_mwh);

            match by_hour.iter_mut().find(|(t, _)| *t == local_hour) {
                Some((_, existing)) => *existing = (*existing + ore_per_kwh) / 2.0,
                None => by_hour.push((local_hour, ore_per_kwh)),
            }
        }

        by_hour.sort_by_key(|(t, _)| *t);
        by_hour.dedup_by_key(|(t, _)| *t);

        by_hour
            .into_iter()
            .map(|(timestamp, raw_price)| PricePoint {
                timestamp,
                price_ore_kwh: self.validate_and_clamp(raw_price),
            })
            .collect()
    }

    fn validate_and_clamp(&self, price: f64) -> f64 {
        if price < 0.0 {
            debug!("clamping negative price {price} to 0");
            return 0.0;
        }
        if price > self.high_price_bound_ore {
            warn!("price {price} exceeds high bound {}, retaining as-is", self.high_price_bound_ore);
        }
        price
    }

    /// A flat fallback series at a conservative constant rate, one entry per
    /// hour in the closed interval `[start, end]` (spec.md §4.3 step 9, §8).
    pub fn fallback_prices(&self, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let days = (end - start).num_days();
        let n_hours = 24 * (days + 1);
        let start_of_day = Local.from_local_datetime(&start.and_hms_opt(0, 0, 0).unwrap()).unwrap();

        (0..n_hours)
            .map(|h| PricePoint {
                timestamp: start_of_day + chrono::TimeDelta::hours(h),
                price_ore_kwh: self.fallback_price_ore,
            })
            .collect()
    }
}

fn local_midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Local
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

fn to_local_hour(instant_utc: DateTime<Utc>) -> DateTime<Local> {
    let shifted = instant_utc + chrono::TimeDelta::hours(LOCAL_OFFSET_HOURS);
    shifted.with_timezone(&Local)
}

fn eur_mwh_to_ore_kwh(eur_per_mwh: f64) -> f64 {
    // EUR/MWh -> SEK/MWh -> SEK/kWh (divide by 1000) -> öre/kWh (times 100),
    // net factor EUR_SEK * 0.1 per spec.md §4.3 step 5.
    eur_per_mwh * EUR_SEK * 0.1
}

/// Logs that this many hours' worth of this run's result carry a synthesized
/// (non-measured) series, used by callers to tag data quality (spec.md §4.7).
pub fn log_synthetic_fallback(area: &str, n: usize) {
    info!("using {n} synthetic price points for {area}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PriceSource {
        PriceSource::new(&PriceSourceConfig {
            api_token: "test-token".into(),
            base_url: "https://example.invalid/api".into(),
            high_price_bound_ore: 800.0,
            fallback_price_ore: 120.0,
        })
    }

    #[test]
    fn fallback_prices_length_and_value() {
        let src = source();
        let start = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let prices = src.fallback_prices(start, end);
        assert_eq!(prices.len(), 48);
        assert!(prices.iter().all(|p| p.price_ore_kwh == 120.0));
    }

    #[test]
    fn validate_and_clamp_negative() {
        let src = source();
        assert_eq!(src.validate_and_clamp(-15.0), 0.0);
    }

    #[test]
    fn validate_and_clamp_retains_extreme() {
        let src = source();
        assert_eq!(src.validate_and_clamp(900.0), 900.0);
    }

    #[test]
    fn unknown_zone_is_surfaced() {
        let src = source();
        let start = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        assert!(matches!(src.fetch("NO1", start, end), Err(PriceSourceError::UnknownZone(_))));
    }
}
