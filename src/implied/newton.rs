//! Newton-Raphson implied volatility with bracket safeguarding.
//!
//! # Iteration
//! ```text
//! σ_{n+1} = clamp(σ_n + (target − price(σ_n)) / vega(σ_n), min_vol, max_vol)
//! ```
//!
//! The call/put price is increasing in σ, so every evaluation also tightens
//! a bracket `[lo, hi]` around the root. A Newton step that lands on or
//! outside the bracket is replaced by its midpoint, which stops the
//! overshoot-to-the-clamp cycle typical of out-of-the-money quotes.

use super::{ImpliedVolResult, SolverStatus};
use crate::config::IvSolverConfig;
use crate::error::Result;
use crate::pricing::black_scholes;
use crate::types::OptionType;
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Configured implied-volatility solver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpliedVolSolver {
    config: IvSolverConfig,
}

impl ImpliedVolSolver {
    pub fn with_config(config: IvSolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IvSolverConfig {
        &self.config
    }

    /// Solve for the volatility reproducing `target_price`.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InvalidInput`](crate::VolForgeError::InvalidInput)
    /// for a negative or non-finite target, non-positive spot/strike/maturity,
    /// or a non-finite rate, and
    /// [`VolForgeError::InvalidConfig`](crate::VolForgeError::InvalidConfig)
    /// for inconsistent solver settings.
    pub fn solve(
        &self,
        target_price: f64,
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        option_type: OptionType,
    ) -> Result<ImpliedVolResult> {
        self.config.validate()?;
        validate_non_negative(target_price, "target_price")?;
        validate_positive(spot, "spot")?;
        validate_positive(strike, "strike")?;
        validate_positive(maturity, "maturity")?;
        validate_finite(rate, "rate")?;

        let cfg = &self.config;
        let (mut lo, mut hi) = (cfg.min_vol, cfg.max_vol);
        let mut sigma = cfg.initial_guess.clamp(lo, hi);

        for iteration in 0..cfg.max_iterations {
            let price = black_scholes::price(option_type, spot, strike, maturity, rate, sigma);
            let diff = target_price - price;
            if diff.abs() < cfg.tolerance {
                return Ok(ImpliedVolResult {
                    vol: sigma,
                    iterations: iteration,
                    status: SolverStatus::Converged,
                });
            }

            if diff > 0.0 {
                lo = sigma;
            } else {
                hi = sigma;
            }

            let vega = black_scholes::vega(spot, strike, maturity, rate, sigma);
            if vega < cfg.vega_floor {
                // Flat price: bisect while the bracket is still open.
                if hi - lo > cfg.tolerance {
                    sigma = 0.5 * (lo + hi);
                    continue;
                }
                #[cfg(feature = "logging")]
                tracing::warn!(
                    target_price,
                    strike,
                    maturity,
                    sigma,
                    vega,
                    "implied vol solver stopped on vega underflow"
                );
                return Ok(ImpliedVolResult {
                    vol: sigma,
                    iterations: iteration,
                    status: SolverStatus::VegaUnderflow,
                });
            }

            let newton = (sigma + diff / vega).clamp(cfg.min_vol, cfg.max_vol);
            sigma = if newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }

        #[cfg(feature = "logging")]
        tracing::warn!(
            target_price,
            strike,
            maturity,
            sigma,
            max_iterations = cfg.max_iterations,
            "implied vol solver hit iteration cap"
        );

        Ok(ImpliedVolResult {
            vol: sigma,
            iterations: cfg.max_iterations,
            status: SolverStatus::MaxIterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VolForgeError;
    use crate::implied::implied_volatility;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_atm_vol() {
        let price = black_scholes::call_price(100.0, 100.0, 0.25, 0.05, 0.2);
        let iv = implied_volatility(price, 100.0, 100.0, 0.25, 0.05, OptionType::Call).unwrap();
        assert_eq!(iv.status, SolverStatus::Converged);
        assert_abs_diff_eq!(iv.vol, 0.2, epsilon = 1e-6);
        assert!(iv.iterations < 10);
    }

    #[test]
    fn recovers_low_vol_otm_put() {
        let price = black_scholes::put_price(100.0, 90.0, 0.5, 0.02, 0.08);
        let iv = implied_volatility(price, 100.0, 90.0, 0.5, 0.02, OptionType::Put).unwrap();
        assert!(iv.is_converged(), "status {:?}", iv.status);
        assert_abs_diff_eq!(iv.vol, 0.08, epsilon = 1e-4);
    }

    #[test]
    fn recovers_very_high_vol() {
        let price = black_scholes::call_price(100.0, 120.0, 1.0, 0.01, 1.8);
        let iv = implied_volatility(price, 100.0, 120.0, 1.0, 0.01, OptionType::Call).unwrap();
        assert!(iv.is_converged());
        assert_abs_diff_eq!(iv.vol, 1.8, epsilon = 1e-5);
    }

    #[test]
    fn flat_start_bisects_towards_the_root() {
        // Short-dated far wing: vega at the 0.30 start is ~0 but large at the
        // true vol.
        for (ot, strike, maturity, vol) in [
            (OptionType::Call, 195.74, 0.093, 1.881),
            (OptionType::Call, 180.0, 0.05, 1.5),
            (OptionType::Put, 55.0, 0.04, 1.7),
        ] {
            assert!(black_scholes::vega(100.0, strike, maturity, 0.02, 0.30) < 1e-10);
            assert!(black_scholes::vega(100.0, strike, maturity, 0.02, vol) > 1.0);
            let price = black_scholes::price(ot, 100.0, strike, maturity, 0.02, vol);
            let iv = implied_volatility(price, 100.0, strike, maturity, 0.02, ot).unwrap();
            assert_eq!(iv.status, SolverStatus::Converged, "{ot} K={strike}");
            assert_abs_diff_eq!(iv.vol, vol, epsilon = 1e-4);
        }
    }

    #[test]
    fn vega_underflow_once_bracket_collapses() {
        // Below intrinsic: every vol overprices, the bracket shrinks to the
        // lower clamp where vega vanishes.
        let iv = implied_volatility(10.0, 100.0, 80.0, 0.5, 0.0, OptionType::Call).unwrap();
        assert_eq!(iv.status, SolverStatus::VegaUnderflow);
        assert!(iv.vol < 0.01);
        assert!(iv.iterations > 0);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let solver = ImpliedVolSolver::with_config(IvSolverConfig {
            max_iterations: 1,
            ..IvSolverConfig::default()
        });
        let price = black_scholes::call_price(100.0, 100.0, 1.0, 0.0, 0.9);
        let iv = solver.solve(price, 100.0, 100.0, 1.0, 0.0, OptionType::Call).unwrap();
        assert_eq!(iv.status, SolverStatus::MaxIterations);
        assert_eq!(iv.iterations, 1);
        assert!(iv.vol >= 0.001 && iv.vol <= 5.0);
    }

    #[test]
    fn unreachable_price_stays_in_clamp_range() {
        // Above the spot: no volatility reproduces it.
        let iv = implied_volatility(150.0, 100.0, 100.0, 1.0, 0.0, OptionType::Call).unwrap();
        assert_ne!(iv.status, SolverStatus::Converged);
        assert!(iv.vol >= 0.001 && iv.vol <= 5.0);
    }

    #[test]
    fn rejects_invalid_inputs() {
        for result in [
            implied_volatility(-1.0, 100.0, 100.0, 1.0, 0.0, OptionType::Call),
            implied_volatility(5.0, 0.0, 100.0, 1.0, 0.0, OptionType::Call),
            implied_volatility(5.0, 100.0, 100.0, 0.0, 0.0, OptionType::Call),
            implied_volatility(f64::NAN, 100.0, 100.0, 1.0, 0.0, OptionType::Call),
        ] {
            assert!(matches!(result, Err(VolForgeError::InvalidInput { .. })));
        }
    }
}
