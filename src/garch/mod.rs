//! GARCH-family conditional volatility models.
//!
//! Three first-order variants share one bounded Nelder-Mead likelihood
//! optimizer and differ only in their variance recursion:
//!
//! ```text
//! GARCH(1,1):  σ²_t = ω + α ε²_{t−1} + β σ²_{t−1}
//! GJR-GARCH:   σ²_t = ω + (α + γ·1[ε_{t−1} < 0]) ε²_{t−1} + β σ²_{t−1}
//! EGARCH:      ln σ²_t = ω + α |z_{t−1}| + γ z_{t−1} + β ln σ²_{t−1},  z = ε/σ
//! ```
//!
//! Fitting never errors on optimizer trouble. A failed fit returns
//! literature-typical GARCH(1,1) parameters with [`FitStatus::Failed`] so the
//! degraded result is visible to the caller.
//!
//! ```
//! use volforge::garch::{GarchFitter, GarchModel};
//!
//! let returns: Vec<f64> = (0..200).map(|i| 0.01 * ((i * 7919) % 13) as f64 / 6.0 - 0.01).collect();
//! let fit = GarchFitter::new(GarchModel::Garch).fit(&returns)?;
//! let params = &fit.params;
//! assert!(params.alpha + params.beta < 1.0);
//! let vols = fit.forecast(5);
//! assert_eq!(vols.len(), 5);
//! # Ok::<(), volforge::VolForgeError>(())
//! ```

pub mod backtest;
mod fit;
mod forecast;
mod model;
mod simulate;

pub use backtest::{BacktestMetrics, GarchBacktest};
pub use fit::{GarchFit, GarchFitter};

use serde::{Deserialize, Serialize};

/// GARCH variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarchModel {
    /// Symmetric GARCH(1,1).
    #[default]
    Garch,
    /// Exponential GARCH with a leverage term.
    Egarch,
    /// Glosten-Jagannathan-Runkle GARCH with a negative-shock indicator.
    GjrGarch,
}

/// Fitted (or fallback) model parameters.
///
/// `omega` is in per-period variance units for GARCH and GJR, and in
/// log-variance units for EGARCH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParameters {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Asymmetry coefficient; `None` for symmetric GARCH.
    pub gamma: Option<f64>,
    /// `α + β` (GARCH), `α + β + γ/2` (GJR) or `β` (EGARCH).
    pub persistence: f64,
    /// Unconditional per-period variance.
    pub long_run_variance: f64,
}

impl GarchParameters {
    /// Fallback ω used when a fit fails.
    pub const FALLBACK_OMEGA: f64 = 1e-4;
    /// Fallback α used when a fit fails.
    pub const FALLBACK_ALPHA: f64 = 0.05;
    /// Fallback β used when a fit fails.
    pub const FALLBACK_BETA: f64 = 0.90;

    /// Symmetric GARCH(1,1) parameters with derived persistence.
    pub fn new(omega: f64, alpha: f64, beta: f64) -> Self {
        let persistence = alpha + beta;
        Self {
            omega,
            alpha,
            beta,
            gamma: None,
            persistence,
            long_run_variance: model::long_run(omega, persistence),
        }
    }

    /// ω = 1e-4, α = 0.05, β = 0.90.
    pub fn fallback() -> Self {
        Self::new(Self::FALLBACK_OMEGA, Self::FALLBACK_ALPHA, Self::FALLBACK_BETA)
    }

    /// Annualized long-run volatility `√(periods · long_run_variance)`.
    pub fn long_run_vol(&self, periods_per_year: f64) -> f64 {
        (self.long_run_variance * periods_per_year).sqrt()
    }

    /// `true` for GJR/EGARCH fits with γ pushing volatility up after losses.
    pub fn has_leverage_effect(&self, model: GarchModel) -> bool {
        match (model, self.gamma) {
            (GarchModel::Egarch, Some(g)) => g < 0.0,
            (GarchModel::GjrGarch, Some(g)) => g > 0.0,
            _ => false,
        }
    }
}

/// Outcome of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FitStatus {
    Converged,
    /// Fallback parameters were substituted.
    Failed(FitFailure),
}

/// Why a fit fell back to default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitFailure {
    /// Fewer returns than `min_observations`, or zero sample variance.
    InsufficientData,
    /// The optimizer hit its iteration cap.
    NonConvergence,
    /// The optimizer never left the penalized region.
    NonFiniteLikelihood,
}
