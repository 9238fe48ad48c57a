use chrono::{DateTime, Local};

use crate::models::Tariff;

/// Partitions `timestamps` into peak-window and all-hour subsets of `kw`,
/// feeding the two billing-peak computations in spec.md §4.2.
///
/// # Arguments
///
/// * 'tariff' - tariff whose peak window decides the split
/// * 'timestamps' - local wall-clock instant for each sample in `kw`
/// * 'kw' - per-hour kW draw, same length as `timestamps`
pub fn split_peak_hours(tariff: &Tariff, timestamps: &[DateTime<Local>], kw: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut peak = Vec::new();
    let mut all = Vec::with_capacity(kw.len());

    for (t, k) in timestamps.iter().zip(kw.iter()) {
        all.push(*k);
        if tariff.is_peak(*t) {
            peak.push(*k);
        }
    }

    (peak, all)
}
