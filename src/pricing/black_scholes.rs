//! Closed-form Black-Scholes prices and Greeks for European options.
//!
//! Arguments follow the order `(spot, strike, maturity, rate, vol)`.
//! For `maturity <= 0` or `vol <= 0` the formulas are undefined; prices fall
//! back to intrinsic value `max(S − K, 0)` / `max(K − S, 0)` and every Greek
//! is zero. Spot and strike are assumed positive.
//!
//! Greek units: vega per 1.0 of volatility, theta per calendar day,
//! rho per 1% move in the rate.

use statrs::function::erf::erfc;

use super::Greeks;
use crate::conventions::{CALENDAR_DAYS_PER_YEAR, discount_factor, forward_price, log_moneyness};
use crate::types::OptionType;

/// Standard normal CDF Φ(x) = ½·erfc(−x/√2).
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal PDF φ(x).
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

#[inline]
fn degenerate(maturity: f64, vol: f64) -> bool {
    !(maturity > 0.0 && vol > 0.0)
}

/// Intrinsic value at expiry.
#[inline]
pub fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// `d1 = (ln(S/K) + (r + σ²/2)·T) / (σ√T)`.
#[inline]
pub fn d1(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    (-log_moneyness(strike, spot) + (rate + 0.5 * vol * vol) * maturity) / (vol * maturity.sqrt())
}

/// `d2 = d1 − σ√T`.
#[inline]
pub fn d2(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    d1(spot, strike, maturity, rate, vol) - vol * maturity.sqrt()
}

#[inline]
fn d1_d2(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> (f64, f64) {
    let d1 = d1(spot, strike, maturity, rate, vol);
    (d1, d1 - vol * maturity.sqrt())
}

pub fn call_price(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    price(OptionType::Call, spot, strike, maturity, rate, vol)
}

pub fn put_price(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    price(OptionType::Put, spot, strike, maturity, rate, vol)
}

/// Black-Scholes price of a European call or put.
pub fn price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    vol: f64,
) -> f64 {
    if degenerate(maturity, vol) {
        return intrinsic(option_type, spot, strike);
    }
    let (d1, d2) = d1_d2(spot, strike, maturity, rate, vol);
    let df = discount_factor(rate, maturity);
    let forward = forward_price(spot, rate, maturity);
    match option_type {
        OptionType::Call => df * (forward * norm_cdf(d1) - strike * norm_cdf(d2)),
        OptionType::Put => df * (strike * norm_cdf(-d2) - forward * norm_cdf(-d1)),
    }
}

/// `Φ(d1)` for calls, `Φ(d1) − 1` for puts.
pub fn delta(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    vol: f64,
) -> f64 {
    if degenerate(maturity, vol) {
        return 0.0;
    }
    let n = norm_cdf(d1(spot, strike, maturity, rate, vol));
    match option_type {
        OptionType::Call => n,
        OptionType::Put => n - 1.0,
    }
}

/// `φ(d1) / (S σ √T)`, identical for calls and puts.
pub fn gamma(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    if degenerate(maturity, vol) {
        return 0.0;
    }
    norm_pdf(d1(spot, strike, maturity, rate, vol)) / (spot * vol * maturity.sqrt())
}

/// `S φ(d1) √T`, identical for calls and puts.
pub fn vega(spot: f64, strike: f64, maturity: f64, rate: f64, vol: f64) -> f64 {
    if degenerate(maturity, vol) {
        return 0.0;
    }
    spot * norm_pdf(d1(spot, strike, maturity, rate, vol)) * maturity.sqrt()
}

/// Daily theta.
///
/// ```text
/// call: [−S φ(d1) σ / (2√T) − r K e^{−rT} Φ(d2)]  / 365
/// put:  [−S φ(d1) σ / (2√T) + r K e^{−rT} Φ(−d2)] / 365
/// ```
pub fn theta(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    vol: f64,
) -> f64 {
    if degenerate(maturity, vol) {
        return 0.0;
    }
    let (d1, d2) = d1_d2(spot, strike, maturity, rate, vol);
    let decay = -spot * norm_pdf(d1) * vol / (2.0 * maturity.sqrt());
    let carry = rate * strike * discount_factor(rate, maturity);
    let annual = match option_type {
        OptionType::Call => decay - carry * norm_cdf(d2),
        OptionType::Put => decay + carry * norm_cdf(-d2),
    };
    annual / CALENDAR_DAYS_PER_YEAR
}

/// Rho per 1% rate move: `±K T e^{−rT} Φ(±d2) / 100`.
pub fn rho(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    vol: f64,
) -> f64 {
    if degenerate(maturity, vol) {
        return 0.0;
    }
    let d2 = d2(spot, strike, maturity, rate, vol);
    let k = strike * maturity * discount_factor(rate, maturity) / 100.0;
    match option_type {
        OptionType::Call => k * norm_cdf(d2),
        OptionType::Put => -k * norm_cdf(-d2),
    }
}

/// All five Greeks for one side.
pub fn greeks(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    vol: f64,
) -> Greeks {
    if degenerate(maturity, vol) {
        return Greeks::default();
    }
    Greeks {
        delta: delta(option_type, spot, strike, maturity, rate, vol),
        gamma: gamma(spot, strike, maturity, rate, vol),
        vega: vega(spot, strike, maturity, rate, vol),
        theta: theta(option_type, spot, strike, maturity, rate, vol),
        rho: rho(option_type, spot, strike, maturity, rate, vol),
    }
}
