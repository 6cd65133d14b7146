//! Multi-step variance forecasts from a fitted model.

use super::GarchFit;
use crate::conventions::annualize_variance;

impl GarchFit {
    /// Per-period variance forecasts for steps `1..=horizon`.
    ///
    /// The first element is the fitted one-step-ahead variance; each later
    /// step applies `σ²_{h} = ω + persistence · σ²_{h−1}` (log-variance
    /// recursion for EGARCH).
    pub fn forecast_variance(&self, horizon: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(horizon);
        let mut var = self.next_variance;
        for h in 0..horizon {
            if h > 0 {
                var = self.model.forecast_step(&self.params, var);
            }
            out.push(var);
        }
        out
    }

    /// Annualized volatility forecasts `√(periods · σ²_h)` for `horizon` steps.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        self.forecast_variance(horizon)
            .into_iter()
            .map(|v| annualize_variance(v, self.periods_per_year))
            .collect()
    }

    /// Annualized volatility over the next `horizon` periods:
    /// `√(periods · mean(σ²_1 … σ²_h))`.
    ///
    /// Returns the one-step vol for `horizon == 0`.
    pub fn term_volatility(&self, horizon: usize) -> f64 {
        let path = self.forecast_variance(horizon.max(1));
        let mean = path.iter().sum::<f64>() / path.len() as f64;
        annualize_variance(mean, self.periods_per_year)
    }

    /// In-sample annualized conditional volatilities.
    pub fn conditional_volatility(&self) -> Vec<f64> {
        self.conditional_variances
            .iter()
            .map(|&v| annualize_variance(v, self.periods_per_year))
            .collect()
    }

    /// Annualized long-run volatility implied by the parameters.
    pub fn long_run_vol(&self) -> f64 {
        self.params.long_run_vol(self.periods_per_year)
    }
}
