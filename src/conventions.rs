//! Market conventions: annualization factors and moneyness helpers.

/// Trading days per year, the conventional annualization factor for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year, used to quote theta as a daily decay.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Scale a per-period volatility to an annual one: `σ · √periods`.
pub fn annualize_vol(per_period_vol: f64, periods_per_year: f64) -> f64 {
    per_period_vol * periods_per_year.sqrt()
}

/// Annualized volatility from a per-period variance: `√(σ² · periods)`.
///
/// Negative variances (rounding noise) are clamped to zero.
pub fn annualize_variance(per_period_variance: f64, periods_per_year: f64) -> f64 {
    (per_period_variance.max(0.0) * periods_per_year).sqrt()
}

/// Convert a strike to log-moneyness: k = ln(K / S).
pub fn log_moneyness(strike: f64, spot: f64) -> f64 {
    (strike / spot).ln()
}

/// Continuous-compounding discount factor e^(−r·T).
pub fn discount_factor(rate: f64, expiry: f64) -> f64 {
    (-rate * expiry).exp()
}

/// Compute forward price from spot: F = S · exp(r · T).
pub fn forward_price(spot: f64, rate: f64, expiry: f64) -> f64 {
    spot * (rate * expiry).exp()
}
