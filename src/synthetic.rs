use rand::Rng;

/// Synthesizes a typical office-hours baseload curve when no measurement is
/// available (spec.md §4.7). Noise is stochastic and unseeded (spec.md §9
/// open question 3): each hour's kW is `subscription_kw * U(lo, hi)`.
///
/// # Arguments
///
/// * 'n' - number of hours in the time grid
/// * 'hour_of_day' - local hour-of-day (0..24) for each of the `n` samples
/// * 'subscription_kw' - the property's subscription ceiling, used as the curve's scale
pub fn synthetic_baseload(n: usize, hour_of_day: &[u32], subscription_kw: f64) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|t| {
            let h = hour_of_day[t];
            let (lo, hi) = if (8..18).contains(&h) {
                (0.30, 0.55)
            } else if (6..8).contains(&h) || (18..22).contains(&h) {
                (0.12, 0.28)
            } else {
                (0.04, 0.12)
            };
            subscription_kw * rng.gen_range(lo..=hi)
        })
        .collect()
}

/// Synthesizes a deliberately conservative (high) hourly price curve when no
/// upstream feed is available (spec.md §4.7): overstating cost rather than
/// overstating savings is the explicit design choice.
///
/// # Arguments
///
/// * 'n' - number of hours in the time grid
/// * 'hour_of_day' - local hour-of-day (0..24) for each of the `n` samples
pub fn synthetic_prices(n: usize, hour_of_day: &[u32]) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    const BASE: f64 = 120.0;
    const EVENING_PEAK: [u32; 7] = [7, 8, 9, 17, 18, 19, 20];

    (0..n)
        .map(|t| {
            let h = hour_of_day[t];
            if EVENING_PEAK.contains(&h) {
                BASE + rng.gen_range(30.0..=80.0)
            } else if h < 5 {
                (BASE - rng.gen_range(0.0..=20.0)).max(0.0)
            } else {
                BASE + rng.gen_range(0.0..=40.0)
            }
        })
        .collect()
}
