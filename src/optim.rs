//! Internal optimization utilities for likelihood maximization.
//!
//! A bounded Nelder-Mead simplex: every trial vertex is projected into the
//! box `[lower, upper]`, and objectives signal infeasible interior regions
//! (e.g. GARCH non-stationarity) by returning [`PENALTY`].

/// Objective value returned for infeasible parameter vectors.
pub(crate) const PENALTY: f64 = 1e10;

/// Configuration for the Nelder-Mead simplex optimizer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence threshold on the simplex diameter, relative to the box width.
    pub diameter_tol: f64,
    /// Convergence threshold on objective value spread.
    pub fvalue_tol: f64,
}

/// Box constraints, one `(lower, upper)` pair per dimension.
#[derive(Debug, Clone)]
pub(crate) struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(pairs: &[(f64, f64)]) -> Self {
        Self {
            lower: pairs.iter().map(|p| p.0).collect(),
            upper: pairs.iter().map(|p| p.1).collect(),
        }
    }

    fn project(&self, x: &mut [f64]) {
        for (i, xi) in x.iter_mut().enumerate() {
            *xi = xi.clamp(self.lower[i], self.upper[i]);
        }
    }

    fn width(&self, i: usize) -> f64 {
        (self.upper[i] - self.lower[i]).abs().max(f64::MIN_POSITIVE)
    }
}

/// Result of a Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub(crate) struct NelderMeadResult {
    /// Best vertex found.
    pub x: Vec<f64>,
    /// Objective value at the best vertex.
    pub fval: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met before `max_iter`.
    pub converged: bool,
}

/// Minimize `objective(x)` over the box `bounds` with the Nelder-Mead method.
///
/// Starts from `x0` with per-dimension perturbations `steps` to form the
/// initial simplex. A perturbation that would leave the box is flipped to
/// the other side of `x0`.
pub(crate) fn nelder_mead<F>(
    objective: F,
    x0: &[f64],
    steps: &[f64],
    bounds: &Bounds,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = x0.len();
    let eval = |x: &[f64]| {
        let f = objective(x);
        if f.is_finite() { f } else { PENALTY }
    };

    let mut start = x0.to_vec();
    bounds.project(&mut start);

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut v = start.clone();
        v[i] += steps[i];
        if v[i] > bounds.upper[i] || v[i] < bounds.lower[i] {
            v[i] = start[i] - steps[i];
        }
        bounds.project(&mut v);
        simplex.push(v);
    }
    let mut f_vals: Vec<f64> = simplex.iter().map(|v| eval(v.as_slice())).collect();

    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iter {
        iterations += 1;

        // Sort by objective value
        let mut idx: Vec<usize> = (0..=n).collect();
        idx.sort_by(|&a, &b| f_vals[a].total_cmp(&f_vals[b]));
        simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
        f_vals = idx.iter().map(|&i| f_vals[i]).collect();

        // Check convergence
        let diameter = simplex[1..]
            .iter()
            .map(|v| {
                v.iter()
                    .zip(simplex[0].iter())
                    .enumerate()
                    .map(|(i, (a, b))| ((a - b) / bounds.width(i)).abs())
                    .fold(0.0_f64, f64::max)
            })
            .fold(0.0_f64, f64::max);
        let f_spread = f_vals[n] - f_vals[0];

        if f_vals[0] < PENALTY && (diameter < config.diameter_tol || f_spread < config.fvalue_tol) {
            converged = true;
            break;
        }

        // Centroid of all but the worst vertex
        let mut centroid = vec![0.0; n];
        for v in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(v.iter()) {
                *c += x / n as f64;
            }
        }
        let toward = |from: &[f64], t: f64| -> Vec<f64> {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(from.iter())
                .map(|(c, f)| c + t * (f - c))
                .collect();
            bounds.project(&mut p);
            p
        };

        // Reflection
        let reflected = toward(simplex[n].as_slice(), -1.0);
        let fr = eval(reflected.as_slice());

        if fr < f_vals[n - 1] && fr >= f_vals[0] {
            simplex[n] = reflected;
            f_vals[n] = fr;
        } else if fr < f_vals[0] {
            // Expansion
            let expanded = toward(simplex[n].as_slice(), -2.0);
            let fe = eval(expanded.as_slice());
            if fe < fr {
                simplex[n] = expanded;
                f_vals[n] = fe;
            } else {
                simplex[n] = reflected;
                f_vals[n] = fr;
            }
        } else {
            // Contraction (outside if the reflection improved on the worst vertex)
            let contracted = if fr < f_vals[n] {
                toward(reflected.as_slice(), 0.5)
            } else {
                toward(simplex[n].as_slice(), 0.5)
            };
            let fc = eval(contracted.as_slice());
            if fc < f_vals[n].min(fr) {
                simplex[n] = contracted;
                f_vals[n] = fc;
            } else {
                // Shrink toward best vertex
                for j in 1..=n {
                    let shrunk: Vec<f64> = simplex[0]
                        .iter()
                        .zip(simplex[j].iter())
                        .map(|(b, x)| b + 0.5 * (x - b))
                        .collect();
                    simplex[j] = shrunk;
                    f_vals[j] = eval(simplex[j].as_slice());
                }
            }
        }
    }

    // Return best vertex
    let best_idx = (0..=n)
        .min_by(|&a, &b| f_vals[a].total_cmp(&f_vals[b]))
        .unwrap_or(0);

    NelderMeadResult {
        x: simplex[best_idx].clone(),
        fval: f_vals[best_idx],
        iterations,
        converged,
    }
}
