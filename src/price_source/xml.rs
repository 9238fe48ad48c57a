use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::price_source::errors::PriceSourceError;

/// Mirrors the subset of the ENTSO-E `publicationdocument:7:3` schema the
/// price source needs: one or more `TimeSeries`, each with one or more
/// `Period` blocks of hourly-or-finer `Point` samples (spec.md §4.3 step 5).
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct PublicationDocument {
    #[serde(rename = "TimeSeries", default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeries {
    #[serde(rename = "Period", default)]
    pub period: Vec<Period>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Period {
    #[serde(rename = "timeInterval")]
    pub time_interval: TimeInterval,
    #[serde(rename = "resolution")]
    pub resolution: String,
    #[serde(rename = "Point", default)]
    pub point: Vec<Point>,
}

#[derive(Deserialize, Debug)]
pub struct TimeInterval {
    #[serde(rename = "start")]
    pub start: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct Point {
    #[serde(rename = "position")]
    pub position: u32,
    #[serde(rename = "price.amount")]
    pub price_amount: f64,
}

/// A single raw point, already resolved to its UTC instant (spec.md §4.3 step 5).
#[derive(Clone, Copy, Debug)]
pub struct RawPoint {
    pub instant_utc: DateTime<Utc>,
    pub eur_per_mwh: f64,
}

/// Resolution string -> minutes (spec.md §8 round-trip law). Unknown resolutions
/// are assumed hourly, with the caller expected to log the fallback.
pub fn resolution_minutes(resolution: &str) -> (i64, bool) {
    match resolution {
        "PT60M" | "PT1H" => (60, true),
        "PT30M" => (30, true),
        "PT15M" => (15, true),
        _ => (60, false),
    }
}

/// Parses an ENTSO-E publication document and flattens every `TimeSeries`/`Period`/
/// `Point` into an ascending-by-construction list of raw UTC points.
pub fn parse_points(xml: &str) -> Result<Vec<RawPoint>, PriceSourceError> {
    let doc: PublicationDocument = quick_xml::de::from_str(xml)?;
    let mut points = Vec::new();

    for series in &doc.time_series {
        for period in &series.period {
            let (minutes, _known) = resolution_minutes(&period.resolution);
            let step = TimeDelta::minutes(minutes);
            for point in &period.point {
                if point.position == 0 {
                    continue;
                }
                let instant_utc = period.time_interval.start + step * (point.position as i32 - 1);
                points.push(RawPoint {
                    instant_utc,
                    eur_per_mwh: point.price_amount,
                });
            }
        }
    }

    Ok(points)
}
