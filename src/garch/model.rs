//! Conditional variance recursions and optimizer geometry per GARCH variant.
//!
//! Parameter vectors are laid out as `[ω, α, β]` for GARCH(1,1) and
//! `[ω, α, γ, β]` for the asymmetric variants.

use std::f64::consts::{FRAC_2_PI, PI};

use super::{GarchModel, GarchParameters};
use crate::optim::{Bounds, PENALTY};

/// E|z| for a standard normal `z`.
fn mean_abs_normal() -> f64 {
    FRAC_2_PI.sqrt()
}

impl GarchModel {
    /// Number of free parameters.
    pub fn n_params(self) -> usize {
        match self {
            GarchModel::Garch => 3,
            GarchModel::Egarch | GarchModel::GjrGarch => 4,
        }
    }

    /// Box constraints given the sample variance of the returns.
    pub(crate) fn bounds(self, sample_var: f64) -> Bounds {
        let omega_hi = 10.0 * sample_var.max(1e-12);
        match self {
            GarchModel::Garch => Bounds::new(&[(1e-12, omega_hi), (0.0, 1.0), (0.0, 1.0)]),
            GarchModel::GjrGarch => {
                Bounds::new(&[(1e-12, omega_hi), (0.0, 1.0), (-1.0, 1.0), (0.0, 1.0)])
            }
            GarchModel::Egarch => {
                Bounds::new(&[(-25.0, 25.0), (0.0, 2.0), (-1.0, 1.0), (0.0, 0.9999)])
            }
        }
    }

    /// Variance-targeted starting point: the implied unconditional variance
    /// equals the sample variance.
    pub(crate) fn start(self, sample_var: f64) -> Vec<f64> {
        let v = sample_var.max(1e-12);
        match self {
            GarchModel::Garch => vec![v * (1.0 - 0.95), 0.05, 0.90],
            GarchModel::GjrGarch => vec![v * (1.0 - 0.95), 0.03, 0.04, 0.90],
            GarchModel::Egarch => {
                let (alpha, gamma, beta) = (0.10, -0.05, 0.95);
                vec![(1.0 - beta) * v.ln() - alpha * mean_abs_normal(), alpha, gamma, beta]
            }
        }
    }

    /// Initial simplex perturbations around [`start`](Self::start).
    pub(crate) fn steps(self, start: &[f64]) -> Vec<f64> {
        match self {
            GarchModel::Garch => vec![0.5 * start[0], 0.03, 0.03],
            GarchModel::GjrGarch => vec![0.5 * start[0], 0.03, 0.03, 0.03],
            GarchModel::Egarch => vec![0.1 * start[0].abs().max(0.1), 0.05, 0.05, 0.02],
        }
    }

    /// Positivity and stationarity of a candidate parameter vector.
    pub(crate) fn is_feasible(self, x: &[f64]) -> bool {
        match self {
            GarchModel::Garch => x[0] > 0.0 && x[1] >= 0.0 && x[2] >= 0.0 && x[1] + x[2] < 1.0,
            GarchModel::GjrGarch => {
                x[0] > 0.0
                    && x[1] >= 0.0
                    && x[3] >= 0.0
                    && x[1] + x[2] >= 0.0
                    && x[1] + x[3] + 0.5 * x[2] < 1.0
            }
            GarchModel::Egarch => x[1] >= 0.0 && x[3].abs() < 1.0,
        }
    }

    /// Conditional variances `σ²_0 … σ²_n` for residuals `eps` of length `n`.
    ///
    /// `σ²_0 = initial_var`; the final element is the one-step-ahead variance
    /// after the last residual.
    pub(crate) fn variance_path(self, x: &[f64], eps: &[f64], initial_var: f64) -> Vec<f64> {
        let mut path = Vec::with_capacity(eps.len() + 1);
        match self {
            GarchModel::Garch => {
                let (omega, alpha, beta) = (x[0], x[1], x[2]);
                let mut var = initial_var;
                path.push(var);
                for e in eps {
                    var = omega + alpha * e * e + beta * var;
                    path.push(var);
                }
            }
            GarchModel::GjrGarch => {
                let (omega, alpha, gamma, beta) = (x[0], x[1], x[2], x[3]);
                let mut var = initial_var;
                path.push(var);
                for &e in eps {
                    let leverage = if e < 0.0 { gamma } else { 0.0 };
                    var = omega + (alpha + leverage) * e * e + beta * var;
                    path.push(var);
                }
            }
            GarchModel::Egarch => {
                let (omega, alpha, gamma, beta) = (x[0], x[1], x[2], x[3]);
                let mut log_var = initial_var.ln();
                path.push(initial_var);
                for e in eps {
                    let z = e / (0.5 * log_var).exp();
                    log_var = omega + alpha * z.abs() + gamma * z + beta * log_var;
                    path.push(log_var.exp());
                }
            }
        }
        path
    }

    /// Gaussian negative log-likelihood, or [`PENALTY`] for infeasible or
    /// degenerate parameter vectors.
    ///
    /// ```text
    /// −LL = ½ Σ [ ln(2π σ²_t) + ε²_t / σ²_t ]
    /// ```
    pub(crate) fn neg_log_likelihood(self, x: &[f64], eps: &[f64], initial_var: f64) -> f64 {
        if !self.is_feasible(x) {
            return PENALTY;
        }
        let path = self.variance_path(x, eps, initial_var);
        let mut nll = 0.0;
        for (e, &var) in eps.iter().zip(path.iter()) {
            if !(var.is_finite() && var > 0.0) {
                return PENALTY;
            }
            nll += (2.0 * PI * var).ln() + e * e / var;
        }
        let nll = 0.5 * nll;
        if nll.is_finite() { nll } else { PENALTY }
    }

    /// Named parameters, persistence and long-run variance for a vector.
    pub(crate) fn parameters(self, x: &[f64]) -> GarchParameters {
        match self {
            GarchModel::Garch => GarchParameters::new(x[0], x[1], x[2]),
            GarchModel::GjrGarch => {
                let (omega, alpha, gamma, beta) = (x[0], x[1], x[2], x[3]);
                let persistence = alpha + beta + 0.5 * gamma;
                GarchParameters {
                    omega,
                    alpha,
                    beta,
                    gamma: Some(gamma),
                    persistence,
                    long_run_variance: long_run(omega, persistence),
                }
            }
            GarchModel::Egarch => {
                let (omega, alpha, gamma, beta) = (x[0], x[1], x[2], x[3]);
                GarchParameters {
                    omega,
                    alpha,
                    beta,
                    gamma: Some(gamma),
                    persistence: beta,
                    long_run_variance: ((omega + alpha * mean_abs_normal()) / (1.0 - beta)).exp(),
                }
            }
        }
    }

    /// Expected next-period variance given the current one.
    ///
    /// EGARCH steps in log-variance with `E|z| = √(2/π)` and `E z = 0`.
    pub(crate) fn forecast_step(self, params: &GarchParameters, prev_var: f64) -> f64 {
        match self {
            GarchModel::Garch | GarchModel::GjrGarch => {
                params.omega + params.persistence * prev_var
            }
            GarchModel::Egarch => (params.omega
                + params.alpha * mean_abs_normal()
                + params.beta * prev_var.max(f64::MIN_POSITIVE).ln())
            .exp(),
        }
    }

    /// Next per-period variance after a standardized shock `z` drawn at
    /// variance `var`.
    pub(crate) fn shock_step(self, params: &GarchParameters, var: f64, z: f64) -> f64 {
        let gamma = params.gamma.unwrap_or(0.0);
        match self {
            GarchModel::Garch => params.omega + (params.alpha * z * z + params.beta) * var,
            GarchModel::GjrGarch => {
                let leverage = if z < 0.0 { gamma } else { 0.0 };
                params.omega + ((params.alpha + leverage) * z * z + params.beta) * var
            }
            GarchModel::Egarch => (params.omega
                + params.alpha * z.abs()
                + gamma * z
                + params.beta * var.max(f64::MIN_POSITIVE).ln())
            .exp(),
        }
    }
}

/// `ω / (1 − persistence)`, infinite for non-stationary parameters.
pub(crate) fn long_run(omega: f64, persistence: f64) -> f64 {
    if persistence < 1.0 {
        omega / (1.0 - persistence)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: [f64; 6] = [0.01, -0.02, 0.015, -0.005, 0.03, -0.01];

    #[test]
    fn garch_recursion_by_hand() {
        let x = [1e-5, 0.1, 0.8];
        let path = GarchModel::Garch.variance_path(&x, &EPS[..2], 2e-4);
        assert_eq!(path.len(), 3);
        assert_abs_diff_eq!(path[1], 1e-5 + 0.1 * 1e-4 + 0.8 * 2e-4, epsilon = 1e-18);
        assert_abs_diff_eq!(path[2], 1e-5 + 0.1 * 4e-4 + 0.8 * path[1], epsilon = 1e-18);
    }

    #[test]
    fn gjr_adds_leverage_only_for_negative_shocks() {
        let x = [1e-5, 0.05, 0.1, 0.8];
        let up = GarchModel::GjrGarch.variance_path(&x, &[0.02], 1e-4);
        let down = GarchModel::GjrGarch.variance_path(&x, &[-0.02], 1e-4);
        assert_abs_diff_eq!(down[1] - up[1], 0.1 * 4e-4, epsilon = 1e-18);
    }

    #[test]
    fn egarch_recursion_in_log_space() {
        let x = [-0.5, 0.1, -0.05, 0.95];
        let path = GarchModel::Egarch.variance_path(&x, &[-0.02], 1e-4);
        let z: f64 = -0.02 / 1e-2;
        let expected = (-0.5 + 0.1 * z.abs() - 0.05 * z + 0.95 * (1e-4_f64).ln()).exp();
        assert_abs_diff_eq!(path[1], expected, epsilon = 1e-15);
    }

    #[test]
    fn non_stationary_garch_is_penalized() {
        assert_eq!(
            GarchModel::Garch.neg_log_likelihood(&[1e-5, 0.3, 0.7], &EPS, 1e-4),
            PENALTY
        );
        assert_eq!(
            GarchModel::Garch.neg_log_likelihood(&[-1e-5, 0.1, 0.7], &EPS, 1e-4),
            PENALTY
        );
        assert!(GarchModel::Garch.neg_log_likelihood(&[1e-5, 0.1, 0.7], &EPS, 1e-4) < PENALTY);
    }

    #[test]
    fn gjr_feasibility_uses_half_gamma() {
        assert!(GarchModel::GjrGarch.is_feasible(&[1e-5, 0.05, 0.1, 0.89]));
        assert!(!GarchModel::GjrGarch.is_feasible(&[1e-5, 0.05, 0.2, 0.86]));
        assert!(!GarchModel::GjrGarch.is_feasible(&[1e-5, 0.05, -0.1, 0.8]));
    }

    #[test]
    fn nll_matches_closed_form_for_constant_variance() {
        // α = β = 0 keeps σ² = ω after the first step.
        let omega = 2e-4;
        let nll = GarchModel::Garch.neg_log_likelihood(&[omega, 0.0, 0.0], &EPS, omega);
        let expected: f64 = 0.5
            * EPS
                .iter()
                .map(|e| (2.0 * PI * omega).ln() + e * e / omega)
                .sum::<f64>();
        assert_abs_diff_eq!(nll, expected, epsilon = 1e-9);
    }

    #[test]
    fn starts_are_feasible_and_variance_targeted() {
        let var = 1.5e-4;
        for model in [GarchModel::Garch, GarchModel::GjrGarch, GarchModel::Egarch] {
            let x0 = model.start(var);
            assert_eq!(x0.len(), model.n_params());
            assert!(model.is_feasible(&x0), "{model:?} start infeasible");
            let p = model.parameters(&x0);
            if model != GarchModel::Egarch {
                assert_abs_diff_eq!(p.long_run_variance, var, epsilon = 1e-12);
            } else {
                assert_abs_diff_eq!(p.long_run_variance.ln(), var.ln(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn forecast_step_converges_to_long_run() {
        let p = GarchModel::Garch.parameters(&[1e-5, 0.1, 0.85]);
        let mut v = 1e-3;
        for _ in 0..2000 {
            v = GarchModel::Garch.forecast_step(&p, v);
        }
        assert_abs_diff_eq!(v, p.long_run_variance, epsilon = 1e-12);
    }
}
