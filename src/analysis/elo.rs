//! Logistic ("Elo") rating conversions.
//!
//! Win rates do not add up across two parties but ratings approximately do,
//! so two-party match-up estimates are decomposed in rating space and then
//! converted back into a probability.

/// Rating points per factor of ten in odds.
const RATING_SCALE: f64 = 400.0;

/// Convert a win probability into a rating. Values outside `[0, 1]` are clamped,
/// the extremes map to negative and positive infinity.
pub fn win_rate_to_rating(win_rate: f64) -> f64 {
    let win_rate = win_rate.clamp(0.0, 1.0);
    if win_rate == 0.0 {
        f64::NEG_INFINITY
    } else if win_rate == 1.0 {
        f64::INFINITY
    } else {
        -RATING_SCALE * (1.0 / win_rate - 1.0).log10()
    }
}

/// Inverse of [`win_rate_to_rating`].
pub fn rating_to_win_rate(rating: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-rating / RATING_SCALE))
}
