//! Maximum-likelihood fitting.

use serde::{Deserialize, Serialize};

use super::{FitFailure, FitStatus, GarchModel, GarchParameters};
use crate::config::GarchConfig;
use crate::error::Result;
use crate::historical::estimators::sample_variance;
use crate::optim::{NelderMeadConfig, PENALTY, nelder_mead};
use crate::series::Series;
use crate::validate::validate_all_finite;

/// Configured fitter for one GARCH variant.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchFitter {
    model: GarchModel,
    config: GarchConfig,
}

/// A fitted model together with its in-sample diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchFit {
    /// Variant the parameters belong to. A failed fit reports `Garch`.
    pub model: GarchModel,
    pub params: GarchParameters,
    pub status: FitStatus,
    /// Maximized Gaussian log-likelihood (evaluated at the fallback
    /// parameters for a failed fit).
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub n_obs: usize,
    pub iterations: usize,
    /// In-sample per-period conditional variances, one per return.
    pub conditional_variances: Vec<f64>,
    /// One-step-ahead per-period variance after the last return.
    pub next_variance: f64,
    pub periods_per_year: f64,
}

impl GarchFit {
    pub fn is_converged(&self) -> bool {
        self.status == FitStatus::Converged
    }

    /// `true` if fallback parameters were substituted.
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, FitStatus::Failed(_))
    }
}

impl GarchFitter {
    pub fn new(model: GarchModel) -> Self {
        Self::with_config(model, GarchConfig::default())
    }

    pub fn with_config(model: GarchModel, config: GarchConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> GarchModel {
        self.model
    }

    pub fn config(&self) -> &GarchConfig {
        &self.config
    }

    /// Fit the log close-to-close returns of a candle series.
    pub fn fit_series(&self, series: &Series) -> Result<GarchFit> {
        self.fit(&series.log_returns())
    }

    /// Fit the model to a return series by maximum likelihood.
    ///
    /// Optimizer failure and short samples do not error: they yield
    /// [`GarchParameters::fallback`] with [`FitStatus::Failed`].
    ///
    /// # Errors
    /// Returns [`InvalidInput`](crate::VolForgeError::InvalidInput) if any
    /// return is NaN or infinite, or
    /// [`InvalidConfig`](crate::VolForgeError::InvalidConfig) for a bad config.
    pub fn fit(&self, returns: &[f64]) -> Result<GarchFit> {
        self.config.validate()?;
        validate_all_finite(returns, "returns")?;

        #[cfg(feature = "logging")]
        tracing::debug!(model = ?self.model, n_obs = returns.len(), "GARCH fit started");

        let residuals = self.residuals(returns);
        let sample_var = sample_variance(&residuals);

        if residuals.len() < self.config.min_observations || !(sample_var > 0.0) {
            return Ok(self.fallback(&residuals, sample_var, FitFailure::InsufficientData, 0));
        }

        let model = self.model;
        let objective = |x: &[f64]| model.neg_log_likelihood(x, &residuals, sample_var);
        let x0 = model.start(sample_var);
        let steps = model.steps(&x0);
        let bounds = model.bounds(sample_var);
        let nm_config = NelderMeadConfig {
            max_iter: self.config.max_iterations,
            diameter_tol: 1e-8,
            fvalue_tol: self.config.tolerance,
        };
        let result = nelder_mead(objective, &x0, &steps, &bounds, &nm_config);

        if result.fval >= PENALTY || !model.is_feasible(&result.x) {
            return Ok(self.fallback(
                &residuals,
                sample_var,
                FitFailure::NonFiniteLikelihood,
                result.iterations,
            ));
        }
        if !result.converged {
            return Ok(self.fallback(
                &residuals,
                sample_var,
                FitFailure::NonConvergence,
                result.iterations,
            ));
        }

        let params = model.parameters(&result.x);
        let mut path = model.variance_path(&result.x, &residuals, sample_var);
        let next_variance = path.pop().unwrap_or(sample_var);
        let log_likelihood = -result.fval;

        #[cfg(feature = "logging")]
        tracing::debug!(
            model = ?model,
            omega = params.omega,
            alpha = params.alpha,
            beta = params.beta,
            gamma = ?params.gamma,
            persistence = params.persistence,
            log_likelihood,
            iterations = result.iterations,
            "GARCH fit complete"
        );

        Ok(self.assemble(
            model,
            params,
            FitStatus::Converged,
            log_likelihood,
            result.iterations,
            path,
            next_variance,
        ))
    }

    fn residuals(&self, returns: &[f64]) -> Vec<f64> {
        if !self.config.demean || returns.is_empty() {
            return returns.to_vec();
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        returns.iter().map(|r| r - mean).collect()
    }

    fn fallback(
        &self,
        residuals: &[f64],
        sample_var: f64,
        reason: FitFailure,
        iterations: usize,
    ) -> GarchFit {
        #[cfg(feature = "logging")]
        tracing::warn!(
            model = ?self.model,
            reason = ?reason,
            n_obs = residuals.len(),
            "GARCH fit failed, using fallback parameters"
        );

        let model = GarchModel::Garch;
        let params = GarchParameters::fallback();
        let x = [params.omega, params.alpha, params.beta];
        let initial_var = if sample_var > 0.0 {
            sample_var
        } else {
            params.long_run_variance
        };
        let mut path = model.variance_path(&x, residuals, initial_var);
        let next_variance = path.pop().unwrap_or(params.long_run_variance);
        let log_likelihood = if residuals.is_empty() {
            0.0
        } else {
            -model.neg_log_likelihood(&x, residuals, initial_var)
        };
        self.assemble(
            model,
            params,
            FitStatus::Failed(reason),
            log_likelihood,
            iterations,
            path,
            next_variance,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        model: GarchModel,
        params: GarchParameters,
        status: FitStatus,
        log_likelihood: f64,
        iterations: usize,
        conditional_variances: Vec<f64>,
        next_variance: f64,
    ) -> GarchFit {
        let n_obs = conditional_variances.len();
        let k = model.n_params() as f64;
        let n = n_obs.max(1) as f64;
        GarchFit {
            model,
            params,
            status,
            log_likelihood,
            aic: 2.0 * k - 2.0 * log_likelihood,
            bic: k * n.ln() - 2.0 * log_likelihood,
            n_obs,
            iterations,
            conditional_variances,
            next_variance,
            periods_per_year: self.config.periods_per_year,
        }
    }
}
