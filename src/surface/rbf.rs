//! Thin-plate spline radial basis function interpolation.
//!
//! ```text
//! s(p) = Σᵢ wᵢ·φ(‖p − pᵢ‖) + c₀ + c₁·x + c₂·y,    φ(r) = r²·ln r
//! ```
//!
//! The weights solve the saddle-point system
//!
//! ```text
//! ┌ Φ  P ┐ ┌ w ┐   ┌ v ┐
//! └ Pᵀ 0 ┘ └ c ┘ = └ 0 ┘
//! ```
//!
//! in unit-normalized `(strike, maturity)` coordinates. Unlike the
//! triangulation-based methods the interpolant is defined everywhere, which
//! suits sparse or irregular quotes.

use nalgebra::{DMatrix, DVector};

use super::SurfaceInterpolator;
use super::interp::{Point, UnitScale, merge_coincident};
use crate::error::{Result, VolForgeError};

/// Thin-plate kernel with φ(0) = 0.
#[inline]
fn thin_plate(r2: f64) -> f64 {
    if r2 > 0.0 { 0.5 * r2 * r2.ln() } else { 0.0 }
}

/// All centers on one line (unit coordinates).
fn collinear(centers: &[(f64, f64)]) -> bool {
    let origin = centers[0];
    let dist2 = |c: &(f64, f64)| (c.0 - origin.0).powi(2) + (c.1 - origin.1).powi(2);
    let Some(far) = centers.iter().max_by(|a, b| dist2(a).total_cmp(&dist2(b))) else {
        return true;
    };
    centers.iter().all(|c| {
        let area = (far.0 - origin.0) * (c.1 - origin.1) - (far.1 - origin.1) * (c.0 - origin.0);
        area.abs() < 1e-12
    })
}

/// Fitted thin-plate spline.
#[derive(Debug, Clone)]
pub struct ThinPlateRbf {
    scale: UnitScale,
    centers: Vec<(f64, f64)>,
    weights: Vec<f64>,
    /// Constant term followed by the x and/or y slopes that were fitted.
    poly: Vec<f64>,
    use_x: bool,
    use_y: bool,
}

impl ThinPlateRbf {
    /// Fit the spline through `points`.
    ///
    /// The polynomial tail drops the strike (maturity) term when every
    /// sample shares one strike (maturity).
    ///
    /// # Errors
    /// [`VolForgeError::NumericalError`] when the linear system is singular
    /// or yields non-finite weights, e.g. collinear samples along a
    /// diagonal.
    pub(crate) fn new(points: &[Point]) -> Result<Self> {
        let merged = merge_coincident(points);
        if merged.is_empty() {
            return Err(VolForgeError::NumericalError {
                message: "thin-plate spline needs at least one point".into(),
            });
        }
        let scale = UnitScale::fit(&merged);
        let centers: Vec<(f64, f64)> = merged.iter().map(|&(k, t, _)| scale.apply(k, t)).collect();
        let use_x = centers.iter().any(|c| c.0 != centers[0].0);
        let use_y = centers.iter().any(|c| c.1 != centers[0].1);
        if use_x && use_y && collinear(&centers) {
            return Err(VolForgeError::NumericalError {
                message: "thin-plate spline linear tail is not identifiable from collinear points"
                    .into(),
            });
        }

        let n = centers.len();
        let m = 1 + usize::from(use_x) + usize::from(use_y);
        let poly_row = |c: (f64, f64)| {
            let mut row = vec![1.0];
            if use_x {
                row.push(c.0);
            }
            if use_y {
                row.push(c.1);
            }
            row
        };
        let poly_rows: Vec<Vec<f64>> = centers.iter().map(|&c| poly_row(c)).collect();

        let a = DMatrix::<f64>::from_fn(n + m, n + m, |i, j| match (i < n, j < n) {
            (true, true) => {
                let (p, q) = (centers[i], centers[j]);
                thin_plate((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2))
            }
            (true, false) => poly_rows[i][j - n],
            (false, true) => poly_rows[j][i - n],
            (false, false) => 0.0,
        });
        let b = DVector::from_iterator(
            n + m,
            merged.iter().map(|p| p.2).chain(std::iter::repeat_n(0.0, m)),
        );

        let solution = a
            .lu()
            .solve(&b)
            .filter(|x| x.iter().all(|v| v.is_finite()))
            .ok_or_else(|| VolForgeError::NumericalError {
                message: format!("thin-plate spline system with {n} points is singular"),
            })?;

        Ok(Self {
            scale,
            centers,
            weights: solution.rows(0, n).iter().copied().collect(),
            poly: solution.rows(n, m).iter().copied().collect(),
            use_x,
            use_y,
        })
    }

    /// Evaluate the spline; `None` only for non-finite input.
    pub fn evaluate(&self, strike: f64, maturity: f64) -> Option<f64> {
        let p = self.scale.apply(strike, maturity);
        if !(p.0.is_finite() && p.1.is_finite()) {
            return None;
        }
        let radial: f64 = self
            .centers
            .iter()
            .zip(&self.weights)
            .map(|(c, w)| w * thin_plate((p.0 - c.0).powi(2) + (p.1 - c.1).powi(2)))
            .sum();
        let mut tail = self.poly[0];
        let mut idx = 1;
        if self.use_x {
            tail += self.poly[idx] * p.0;
            idx += 1;
        }
        if self.use_y {
            tail += self.poly[idx] * p.1;
        }
        let v = radial + tail;
        v.is_finite().then_some(v)
    }
}

impl SurfaceInterpolator for ThinPlateRbf {
    fn interpolate(&self, strike: f64, maturity: f64) -> Option<f64> {
        self.evaluate(strike, maturity)
    }
}
