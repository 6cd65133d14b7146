//! Monte-Carlo return paths from a fitted model.
//!
//! Each path starts from the fitted one-step-ahead variance and draws
//! standard normal shocks `z_t`, emitting `ε_t = σ_t · z_t` and feeding
//! `z_t` back through the model's own variance recursion.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::GarchFit;

impl GarchFit {
    /// `n_paths` simulated paths of `n_steps` per-period returns each.
    ///
    /// Results are reproducible for a seeded `rng`. Paths are drawn in
    /// order, one after another, from the same generator.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        n_steps: usize,
        n_paths: usize,
        rng: &mut R,
    ) -> Vec<Vec<f64>> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            model = ?self.model,
            n_steps,
            n_paths,
            start_variance = self.next_variance,
            "simulating GARCH paths"
        );

        (0..n_paths)
            .map(|_| {
                let mut var = self.next_variance;
                (0..n_steps)
                    .map(|_| {
                        let z: f64 = StandardNormal.sample(&mut *rng);
                        let e = var.sqrt() * z;
                        var = self.model.shock_step(&self.params, var, z);
                        e
                    })
                    .collect()
            })
            .collect()
    }
}
