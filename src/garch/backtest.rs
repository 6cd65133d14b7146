//! Rolling-window out-of-sample evaluation of GARCH volatility forecasts.
//!
//! At every origin `i` the model is refit on the `window` returns ending at
//! `i`, and its one-step annualized forecast is compared with the realized
//! volatility of the following `horizon` returns.
//!
//! Origins run over `window ..= len − horizon` inclusive, so the last origin
//! is scored against the final `horizon` returns and `len − window − horizon
//! + 1` forecasts are produced.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{GarchFitter, GarchModel};
use crate::config::GarchConfig;
use crate::conventions::annualize_vol;
use crate::error::{Result, VolForgeError};
use crate::validate::validate_all_finite;

/// Forecast-accuracy metrics of a rolling backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Share of consecutive origins where forecast and realized vol moved
    /// in the same direction.
    pub directional_accuracy: f64,
    pub n_forecasts: usize,
    /// Fits that fell back to default parameters.
    pub n_fallbacks: usize,
    pub forecasts: Vec<f64>,
    pub realized: Vec<f64>,
}

/// Rolling GARCH forecast backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchBacktest {
    fitter: GarchFitter,
    window: usize,
    horizon: usize,
}

impl GarchBacktest {
    /// Default training window (one trading year).
    pub const DEFAULT_WINDOW: usize = 252;
    /// Default realized-vol horizon (one trading month).
    pub const DEFAULT_HORIZON: usize = 21;

    pub fn new(model: GarchModel) -> Self {
        Self {
            fitter: GarchFitter::new(model),
            window: Self::DEFAULT_WINDOW,
            horizon: Self::DEFAULT_HORIZON,
        }
    }

    pub fn with_config(model: GarchModel, config: GarchConfig) -> Self {
        Self {
            fitter: GarchFitter::with_config(model, config),
            ..Self::new(model)
        }
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Run the backtest over `returns`.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InsufficientData`] if fewer than
    /// `window + horizon + 1` returns are supplied (two forecast origins are
    /// needed for directional accuracy), and [`VolForgeError::InvalidInput`]
    /// for non-finite returns or a zero window/horizon.
    pub fn run(&self, returns: &[f64]) -> Result<BacktestMetrics> {
        if self.window == 0 || self.horizon == 0 {
            return Err(VolForgeError::InvalidInput {
                message: format!(
                    "backtest window and horizon must be > 0, got {} and {}",
                    self.window, self.horizon
                ),
            });
        }
        validate_all_finite(returns, "returns")?;
        let required = self.window + self.horizon + 1;
        if returns.len() < required {
            return Err(VolForgeError::InsufficientData {
                context: "garch_backtest",
                required,
                available: returns.len(),
            });
        }

        let origins: Vec<usize> = (self.window..=returns.len() - self.horizon).collect();

        #[cfg(feature = "logging")]
        tracing::debug!(
            model = ?self.fitter.model(),
            n_origins = origins.len(),
            window = self.window,
            horizon = self.horizon,
            "GARCH backtest started"
        );

        #[cfg(feature = "parallel")]
        let points: Vec<(f64, f64, bool)> = origins
            .par_iter()
            .map(|&i| self.evaluate(returns, i))
            .collect::<Result<_>>()?;
        #[cfg(not(feature = "parallel"))]
        let points: Vec<(f64, f64, bool)> = origins
            .iter()
            .map(|&i| self.evaluate(returns, i))
            .collect::<Result<_>>()?;

        let forecasts: Vec<f64> = points.iter().map(|p| p.0).collect();
        let realized: Vec<f64> = points.iter().map(|p| p.1).collect();
        let n_fallbacks = points.iter().filter(|p| p.2).count();
        let n = forecasts.len() as f64;

        let mse = forecasts
            .iter()
            .zip(&realized)
            .map(|(f, r)| (f - r).powi(2))
            .sum::<f64>()
            / n;
        let mae = forecasts
            .iter()
            .zip(&realized)
            .map(|(f, r)| (f - r).abs())
            .sum::<f64>()
            / n;
        let hits = forecasts
            .windows(2)
            .zip(realized.windows(2))
            .filter(|(f, r)| (f[1] > f[0]) == (r[1] > r[0]))
            .count();
        let directional_accuracy = hits as f64 / (forecasts.len() - 1) as f64;

        Ok(BacktestMetrics {
            mse,
            mae,
            rmse: mse.sqrt(),
            directional_accuracy,
            n_forecasts: forecasts.len(),
            n_fallbacks,
            forecasts,
            realized,
        })
    }

    /// One-step forecast at origin `i` and the realized vol that follows.
    fn evaluate(&self, returns: &[f64], i: usize) -> Result<(f64, f64, bool)> {
        let fit = self.fitter.fit(&returns[i - self.window..i])?;
        let forecast = fit.forecast(1).first().copied().unwrap_or(0.0);
        let future = &returns[i..i + self.horizon];
        let mean = future.iter().sum::<f64>() / future.len() as f64;
        let var = future.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / future.len() as f64;
        let realized = annualize_vol(var.sqrt(), fit.periods_per_year);
        Ok((forecast, realized, fit.is_fallback()))
    }
}
