//! Shared helpers for scattered-point surface interpolation.

/// One observation `(strike, maturity, implied_vol)`.
pub(crate) type Point = (f64, f64, f64);

/// Affine map of the observed strike/maturity box onto the unit square.
///
/// Strikes and maturities differ by orders of magnitude; triangulation,
/// RBF distances and nearest-neighbour search all work in the scaled
/// coordinates. A zero span maps to a unit span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UnitScale {
    k0: f64,
    k_span: f64,
    t0: f64,
    t_span: f64,
}

impl UnitScale {
    pub fn fit(points: &[Point]) -> Self {
        let (mut k_lo, mut k_hi) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut t_lo, mut t_hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(k, t, _) in points {
            k_lo = k_lo.min(k);
            k_hi = k_hi.max(k);
            t_lo = t_lo.min(t);
            t_hi = t_hi.max(t);
        }
        let span = |lo: f64, hi: f64| if hi > lo { hi - lo } else { 1.0 };
        Self {
            k0: if k_lo.is_finite() { k_lo } else { 0.0 },
            k_span: span(k_lo, k_hi),
            t0: if t_lo.is_finite() { t_lo } else { 0.0 },
            t_span: span(t_lo, t_hi),
        }
    }

    #[inline]
    pub fn apply(&self, strike: f64, maturity: f64) -> (f64, f64) {
        ((strike - self.k0) / self.k_span, (maturity - self.t0) / self.t_span)
    }
}

/// Average implied vols of samples sharing the same `(strike, maturity)`.
///
/// Output is sorted by maturity, then strike.
pub(crate) fn merge_coincident(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)));
    let mut merged: Vec<Point> = Vec::with_capacity(sorted.len());
    let mut count = 0usize;
    for p in sorted {
        match merged.last_mut() {
            Some(last) if last.0 == p.0 && last.1 == p.1 => {
                count += 1;
                last.2 += (p.2 - last.2) / count as f64;
            }
            _ => {
                merged.push(p);
                count = 1;
            }
        }
    }
    merged
}

/// Piecewise-linear interpolation with linear extrapolation beyond the ends.
///
/// `xs` must be strictly increasing with at least two elements.
pub(crate) fn linear_extrapolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    let i = xs.partition_point(|&v| v < x).clamp(1, n - 1);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub(crate) fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn merge_averages_duplicates() {
        let pts = [
            (100.0, 0.5, 0.20),
            (90.0, 0.5, 0.25),
            (100.0, 0.5, 0.24),
            (100.0, 0.25, 0.30),
            (100.0, 0.5, 0.22),
        ];
        let merged = merge_coincident(&pts);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], (100.0, 0.25, 0.30));
        assert_eq!(merged[1], (90.0, 0.5, 0.25));
        assert_abs_diff_eq!(merged[2].2, 0.22, epsilon = 1e-15);
    }

    #[test]
    fn linear_extrapolates_both_sides() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 40.0];
        assert_abs_diff_eq!(linear_extrapolate(&xs, &ys, 3.0), 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(linear_extrapolate(&xs, &ys, 0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(linear_extrapolate(&xs, &ys, 5.0), 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(linear_extrapolate(&xs, &ys, 2.0), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_scale_maps_box_corners() {
        let pts = [(80.0, 0.25, 0.2), (120.0, 1.25, 0.2)];
        let s = UnitScale::fit(&pts);
        assert_eq!(s.apply(80.0, 0.25), (0.0, 0.0));
        assert_eq!(s.apply(120.0, 1.25), (1.0, 1.0));
        let flat = UnitScale::fit(&[(100.0, 0.5, 0.2)]);
        assert_eq!(flat.apply(101.0, 0.5), (1.0, 0.0));
    }

    #[test]
    fn linspace_hits_endpoints() {
        let v = linspace(0.1, 2.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 0.1);
        assert_eq!(v[4], 2.0);
        assert_eq!(linspace(1.0, 1.0, 1), vec![1.0]);
    }
}
