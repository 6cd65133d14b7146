//! Implied volatility extraction from option prices.
//!
//! A safeguarded Newton-Raphson solver on the Black-Scholes price. Non-
//! convergence is not an error: the solver returns its best estimate with a
//! [`SolverStatus`] describing how it stopped.

pub mod newton;

pub use newton::ImpliedVolSolver;

use serde::{Deserialize, Serialize};

use crate::config::IvSolverConfig;
use crate::types::OptionType;

/// How the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// `|target − price(σ)| < tolerance`.
    Converged,
    /// Iteration cap reached; `vol` is the last iterate.
    MaxIterations,
    /// Vega fell below the floor; `vol` is the last iterate.
    VegaUnderflow,
}

/// Solver output: the volatility estimate and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolResult {
    pub vol: f64,
    pub iterations: usize,
    pub status: SolverStatus,
}

impl ImpliedVolResult {
    pub fn is_converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }
}

/// Implied volatility with the default solver settings
/// (start 0.30, tolerance 1e-6, 100 iterations, clamp `[0.001, 5.0]`).
pub fn implied_volatility(
    target_price: f64,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    option_type: OptionType,
) -> crate::error::Result<ImpliedVolResult> {
    ImpliedVolSolver::default().solve(target_price, spot, strike, maturity, rate, option_type)
}

/// Implied volatility with explicit solver settings.
pub fn implied_volatility_with(
    target_price: f64,
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    option_type: OptionType,
    config: &IvSolverConfig,
) -> crate::error::Result<ImpliedVolResult> {
    ImpliedVolSolver::with_config(config.clone()).solve(
        target_price,
        spot,
        strike,
        maturity,
        rate,
        option_type,
    )
}
