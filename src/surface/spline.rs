//! Natural cubic splines along maturity slices.
//!
//! The "cubic" surface method: each maturity slice with at least three
//! distinct strikes gets a natural cubic spline in strike (two strikes fall
//! back to a straight line). Between neighbouring slices the two spline
//! values are blended linearly in maturity. Where the slices do not cover a
//! query, the Delaunay linear value is used, so the method is defined on
//! the convex hull of the points and undefined outside it.
//!
//! # Algorithm
//!
//! Each spline is solved via the Thomas algorithm (O(n) tridiagonal solver)
//! with natural boundary conditions (S''(x₀) = S''(xₙ₋₁) = 0).
//! Evaluation uses binary search + Horner form for O(log n) per query.

use super::SurfaceInterpolator;
use super::delaunay::Triangulation;
use super::interp::{Point, merge_coincident};

/// Coefficients for one cubic polynomial interval.
///
/// On interval \[xᵢ, xᵢ₊₁\], the spline is:
/// `S(x) = a + b·(x - xᵢ) + c·(x - xᵢ)² + d·(x - xᵢ)³`
#[derive(Debug, Clone)]
struct SplineCoeff {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

/// Natural cubic spline through `(x, y)` knots.
#[derive(Debug, Clone)]
pub(crate) struct NaturalSpline {
    x: Vec<f64>,
    coeffs: Vec<SplineCoeff>,
    y_last: f64,
}

impl NaturalSpline {
    /// `x` strictly increasing with at least two knots.
    pub fn new(x: Vec<f64>, y: &[f64]) -> Self {
        let coeffs = build_spline_coefficients(&x, y);
        let y_last = y[y.len() - 1];
        Self { x, coeffs, y_last }
    }

    /// Spline value inside the knot range, `None` outside it.
    pub fn eval(&self, x: f64) -> Option<f64> {
        let n = self.x.len();
        if !(x >= self.x[0] && x <= self.x[n - 1]) {
            return None;
        }
        if x == self.x[n - 1] {
            return Some(self.y_last);
        }
        // Binary search for interval index
        let i = self.x.partition_point(|&k| k <= x).saturating_sub(1);
        let dx = x - self.x[i];
        let c = &self.coeffs[i];
        // Horner form: a + dx*(b + dx*(c + dx*d))
        Some(c.a + dx * (c.b + dx * (c.c + dx * c.d)))
    }
}

/// Solve the natural cubic spline tridiagonal system and return
/// per-interval coefficients.
fn build_spline_coefficients(x: &[f64], y: &[f64]) -> Vec<SplineCoeff> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Second-derivative coefficients with c[0] = c[n-1] = 0.
    let mut c = vec![0.0; n];

    if n > 2 {
        let m = n - 2; // number of interior unknowns

        let mut diag = vec![0.0; m];
        let mut rhs = vec![0.0; m];

        for j in 0..m {
            let i = j + 1;
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            rhs[j] = 3.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // Thomas algorithm: forward sweep
        for j in 1..m {
            let w = h[j] / diag[j - 1];
            diag[j] -= w * h[j];
            rhs[j] -= w * rhs[j - 1];
        }

        // Back substitution
        c[m] = rhs[m - 1] / diag[m - 1];
        for j in (0..m - 1).rev() {
            let i = j + 1;
            c[i] = (rhs[j] - h[j + 1] * c[i + 1]) / diag[j];
        }
    }

    (0..n - 1)
        .map(|i| SplineCoeff {
            a: y[i],
            b: (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0,
            c: c[i],
            d: (c[i + 1] - c[i]) / (3.0 * h[i]),
        })
        .collect()
}

/// Per-maturity strike splines blended linearly across maturities.
#[derive(Debug, Clone)]
pub struct SliceSpline {
    /// `(maturity, spline)` sorted by maturity; only slices with ≥ 2 strikes.
    slices: Vec<(f64, NaturalSpline)>,
    linear: Triangulation,
}

impl SliceSpline {
    pub(crate) fn new(points: &[Point]) -> Self {
        let merged = merge_coincident(points);
        let mut slices = Vec::new();
        let mut start = 0;
        while start < merged.len() {
            let t = merged[start].1;
            let end = start + merged[start..].iter().take_while(|p| p.1 == t).count();
            if end - start >= 2 {
                // merge_coincident sorts by (maturity, strike) with unique strikes
                let x: Vec<f64> = merged[start..end].iter().map(|p| p.0).collect();
                let y: Vec<f64> = merged[start..end].iter().map(|p| p.2).collect();
                slices.push((t, NaturalSpline::new(x, &y)));
            }
            start = end;
        }
        Self {
            slices,
            linear: Triangulation::new(&merged),
        }
    }

    pub fn n_slices(&self) -> usize {
        self.slices.len()
    }

    fn slice_value(&self, strike: f64, maturity: f64) -> Option<f64> {
        let i = self.slices.partition_point(|s| s.0 < maturity);
        if let Some((t, spline)) = self.slices.get(i)
            && *t == maturity
        {
            return spline.eval(strike);
        }
        if i == 0 || i == self.slices.len() {
            return None;
        }
        let (t0, lo) = &self.slices[i - 1];
        let (t1, hi) = &self.slices[i];
        let v0 = lo.eval(strike)?;
        let v1 = hi.eval(strike)?;
        let w = (maturity - t0) / (t1 - t0);
        Some(v0 + w * (v1 - v0))
    }
}

impl SurfaceInterpolator for SliceSpline {
    fn interpolate(&self, strike: f64, maturity: f64) -> Option<f64> {
        if !(strike.is_finite() && maturity.is_finite()) {
            return None;
        }
        let linear = self.linear.interpolate(strike, maturity)?;
        Some(self.slice_value(strike, maturity).unwrap_or(linear))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spline_passes_through_knots() {
        let x = vec![80.0, 90.0, 100.0, 110.0, 120.0];
        let y = [0.28, 0.24, 0.20, 0.23, 0.27];
        let s = NaturalSpline::new(x.clone(), &y);
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(s.eval(*xi).unwrap(), *yi, epsilon = 1e-12);
        }
        assert!(s.eval(79.0).is_none());
        assert!(s.eval(121.0).is_none());
    }

    #[test]
    fn spline_reproduces_lines() {
        let s = NaturalSpline::new(vec![0.0, 1.0, 3.0, 4.0], &[1.0, 3.0, 7.0, 9.0]);
        assert_abs_diff_eq!(s.eval(2.0).unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.eval(0.5).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn two_knot_spline_is_linear() {
        let s = NaturalSpline::new(vec![1.0, 2.0], &[0.3, 0.5]);
        assert_abs_diff_eq!(s.eval(1.5).unwrap(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn spline_is_smooth_between_knots() {
        // Symmetric smile: spline minimum stays near the ATM knot
        let s = NaturalSpline::new(vec![80.0, 90.0, 100.0, 110.0, 120.0], &[0.3, 0.24, 0.2, 0.24, 0.3]);
        let left = s.eval(95.0).unwrap();
        let right = s.eval(105.0).unwrap();
        assert_abs_diff_eq!(left, right, epsilon = 1e-12);
        assert!(left > 0.2 && left < 0.24);
    }

    fn smile_points() -> Vec<Point> {
        let mut pts = Vec::new();
        for &(t, atm) in &[(0.25, 0.30), (1.0, 0.20)] {
            for &k in &[80.0, 90.0, 100.0, 110.0, 120.0] {
                let m: f64 = k / 100.0 - 1.0;
                pts.push((k, t, atm + 0.5 * m * m));
            }
        }
        pts
    }

    #[test]
    fn blends_slices_linearly_in_maturity() {
        let surf = SliceSpline::new(&smile_points());
        assert_eq!(surf.n_slices(), 2);
        let v = surf.interpolate(100.0, 0.625).unwrap();
        assert_abs_diff_eq!(v, 0.25, epsilon = 1e-12);
        let on_slice = surf.interpolate(90.0, 0.25).unwrap();
        assert_abs_diff_eq!(on_slice, 0.305, epsilon = 1e-12);
    }

    #[test]
    fn undefined_outside_hull() {
        let surf = SliceSpline::new(&smile_points());
        assert!(surf.interpolate(100.0, 2.0).is_none());
        assert!(surf.interpolate(130.0, 0.5).is_none());
    }

    #[test]
    fn falls_back_to_linear_without_slices() {
        // Every maturity distinct: no usable slice
        let pts = [
            (80.0, 0.2, 0.3),
            (120.0, 0.3, 0.3),
            (100.0, 1.0, 0.3),
            (95.0, 0.6, 0.3),
        ];
        let surf = SliceSpline::new(&pts);
        assert_eq!(surf.n_slices(), 0);
        assert_abs_diff_eq!(surf.interpolate(100.0, 0.5).unwrap(), 0.3, epsilon = 1e-12);
    }
}
