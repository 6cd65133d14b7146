//! Range- and return-based realized-volatility formulas.
//!
//! Each function takes exactly the candles it should use and the
//! annualization factor; window selection and "not computable" signalling
//! live in [`HistoricalVolatilityEstimator`](super::HistoricalVolatilityEstimator).
//! Every formula works on log price ratios, so scaling all prices by a
//! positive constant leaves the result unchanged.
//!
//! # References
//! - Parkinson, M. "The Extreme Value Method for Estimating the Variance of the Rate of Return" (1980)
//! - Garman, M. & Klass, M. "On the Estimation of Security Price Volatilities from Historical Data" (1980)
//! - Rogers, L.C.G. & Satchell, S.E. "Estimating Variance from High, Low and Closing Prices" (1991)
//! - Yang, D. & Zhang, Q. "Drift-Independent Volatility Estimation" (2000)

use std::f64::consts::LN_2;

use crate::conventions::{annualize_variance, annualize_vol};
use crate::series::Candle;

/// Sample variance with an `n − 1` denominator; zero for fewer than two values.
pub(crate) fn sample_variance(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / n as f64;
    xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

fn mean(xs: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }
    xs.sum::<f64>() / n as f64
}

/// Rogers-Satchell per-candle term `ln(H/C)·ln(H/O) + ln(L/C)·ln(L/O)`.
///
/// Non-negative whenever the high/low bracket the open and close.
fn rogers_satchell_term(c: &Candle) -> f64 {
    let hc = (c.high / c.close).ln();
    let ho = (c.high / c.open).ln();
    let lc = (c.low / c.close).ln();
    let lo = (c.low / c.open).ln();
    hc * ho + lc * lo
}

/// Annualized standard deviation of log close-to-close returns.
///
/// `candles.len() − 1` returns are used.
pub fn close_to_close(candles: &[Candle], periods_per_year: f64) -> f64 {
    let returns: Vec<f64> = candles
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();
    annualize_vol(sample_variance(&returns).sqrt(), periods_per_year)
}

/// Parkinson high-low estimator.
///
/// ```text
/// σ² = periods / (4 ln 2) · mean(ln(H/L)²)
/// ```
pub fn parkinson(candles: &[Candle], periods_per_year: f64) -> f64 {
    let m = mean(candles.iter().map(|c| (c.high / c.low).ln().powi(2)));
    annualize_variance(m / (4.0 * LN_2), periods_per_year)
}

/// Garman-Klass OHLC estimator.
///
/// ```text
/// σ² = periods · mean(0.5·ln(H/L)² − (2 ln 2 − 1)·ln(C/O)²)
/// ```
///
/// The per-window mean can dip below zero for candles with tiny ranges and
/// large bodies; it is clamped at zero.
pub fn garman_klass(candles: &[Candle], periods_per_year: f64) -> f64 {
    let c = 2.0 * LN_2 - 1.0;
    let m = mean(candles.iter().map(|k| {
        let hl = (k.high / k.low).ln();
        let co = (k.close / k.open).ln();
        0.5 * hl * hl - c * co * co
    }));
    annualize_variance(m, periods_per_year)
}

/// Rogers-Satchell drift-independent estimator.
pub fn rogers_satchell(candles: &[Candle], periods_per_year: f64) -> f64 {
    let m = mean(candles.iter().map(rogers_satchell_term));
    annualize_variance(m, periods_per_year)
}

/// Yang-Zhang estimator: overnight variance plus a weighted blend of
/// close-to-close variance and the Rogers-Satchell term.
///
/// ```text
/// k  = 0.34 / (1.34 + (n + 1)/(n − 1))
/// σ² = σ²_overnight + k·σ²_cc + (1 − k)·RS
/// ```
///
/// `n` is the number of candles; the overnight and close-to-close series
/// have `n − 1` elements. Requires `n >= 3`.
pub fn yang_zhang(candles: &[Candle], periods_per_year: f64) -> f64 {
    let n = candles.len() as f64;
    let overnight: Vec<f64> = candles
        .windows(2)
        .map(|w| (w[1].open / w[0].close).ln())
        .collect();
    let close_close: Vec<f64> = candles
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();
    let rs = mean(candles.iter().map(rogers_satchell_term));

    let k = 0.34 / (1.34 + (n + 1.0) / (n - 1.0));
    let var = sample_variance(&overnight) + k * sample_variance(&close_close) + (1.0 - k) * rs;
    annualize_variance(var, periods_per_year)
}
