//! Delaunay triangulation (Bowyer-Watson) with barycentric interpolation.
//!
//! Piecewise-linear interpolation over scattered `(strike, maturity)`
//! points. Queries outside the convex hull of the points are undefined.
//!
//! # References
//! - Bowyer, A. "Computing Dirichlet Tessellations" (1981)
//! - Watson, D.F. "Computing the n-dimensional Delaunay Tessellation" (1981)

use super::SurfaceInterpolator;
use super::interp::{Point, UnitScale, merge_coincident};

/// Barycentric tolerance for points on a triangle edge.
const EDGE_TOL: f64 = 1e-10;
/// Triangles with smaller doubled area (in unit coordinates) are dropped.
const MIN_AREA: f64 = 1e-14;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    /// Circumcircle centre and squared radius.
    cx: f64,
    cy: f64,
    r2: f64,
}

/// Twice the signed area of `abc`; positive for counter-clockwise order.
#[inline]
fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

impl Triangle {
    fn new(mut v: [usize; 3], xy: &[(f64, f64)]) -> Option<Self> {
        let area = orient(xy[v[0]], xy[v[1]], xy[v[2]]);
        if area.abs() < MIN_AREA {
            return None;
        }
        if area < 0.0 {
            v.swap(1, 2);
        }
        let (a, b, c) = (xy[v[0]], xy[v[1]], xy[v[2]]);
        let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
        let a2 = a.0 * a.0 + a.1 * a.1;
        let b2 = b.0 * b.0 + b.1 * b.1;
        let c2 = c.0 * c.0 + c.1 * c.1;
        let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
        let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
        let r2 = (a.0 - cx).powi(2) + (a.1 - cy).powi(2);
        Some(Self { v, cx, cy, r2 })
    }

    #[inline]
    fn circumcircle_contains(&self, p: (f64, f64)) -> bool {
        (p.0 - self.cx).powi(2) + (p.1 - self.cy).powi(2) < self.r2 * (1.0 - 1e-12)
    }
}

/// Delaunay triangulation of the observed points.
#[derive(Debug, Clone)]
pub struct Triangulation {
    scale: UnitScale,
    xy: Vec<(f64, f64)>,
    values: Vec<f64>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Triangulate `(strike, maturity, vol)` samples.
    ///
    /// Coincident samples are averaged first. Fewer than three distinct or
    /// collinear points produce an empty triangulation.
    pub(crate) fn new(points: &[Point]) -> Self {
        let merged = merge_coincident(points);
        let scale = UnitScale::fit(&merged);
        let xy: Vec<(f64, f64)> = merged.iter().map(|&(k, t, _)| scale.apply(k, t)).collect();
        let values: Vec<f64> = merged.iter().map(|p| p.2).collect();
        let triangles = if xy.len() >= 3 {
            bowyer_watson(&xy)
        } else {
            Vec::new()
        };
        Self {
            scale,
            xy,
            values,
            triangles,
        }
    }

    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Barycentric interpolation inside the hull, `None` outside it.
    pub fn interpolate(&self, strike: f64, maturity: f64) -> Option<f64> {
        let p = self.scale.apply(strike, maturity);
        if !(p.0.is_finite() && p.1.is_finite()) {
            return None;
        }
        for t in &self.triangles {
            let (a, b, c) = (self.xy[t[0]], self.xy[t[1]], self.xy[t[2]]);
            let area = orient(a, b, c);
            let wa = orient(p, b, c) / area;
            let wb = orient(a, p, c) / area;
            let wc = 1.0 - wa - wb;
            if wa >= -EDGE_TOL && wb >= -EDGE_TOL && wc >= -EDGE_TOL {
                return Some(
                    wa * self.values[t[0]] + wb * self.values[t[1]] + wc * self.values[t[2]],
                );
            }
        }
        None
    }

    /// Value of the nearest sample in unit coordinates.
    pub fn nearest(&self, strike: f64, maturity: f64) -> Option<f64> {
        let p = self.scale.apply(strike, maturity);
        self.xy
            .iter()
            .zip(&self.values)
            .map(|(q, &v)| ((q.0 - p.0).powi(2) + (q.1 - p.1).powi(2), v))
            .filter(|(d, _)| d.is_finite())
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, v)| v)
    }
}

impl SurfaceInterpolator for Triangulation {
    fn interpolate(&self, strike: f64, maturity: f64) -> Option<f64> {
        Triangulation::interpolate(self, strike, maturity)
    }
}

/// Incremental Bowyer-Watson over points in the unit square.
fn bowyer_watson(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let n = points.len();
    let mut xy = points.to_vec();
    // Super-triangle enclosing the unit square with a wide margin.
    xy.push((-19.5, -0.5));
    xy.push((20.5, -0.5));
    xy.push((0.5, 20.5));

    let mut triangles: Vec<Triangle> = Triangle::new([n, n + 1, n + 2], &xy).into_iter().collect();

    for i in 0..n {
        let p = xy[i];
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) =
            triangles.into_iter().partition(|t| t.circumcircle_contains(p));
        triangles = good;

        // Boundary of the cavity: edges belonging to exactly one bad triangle.
        let mut edges: Vec<(usize, usize)> = Vec::with_capacity(bad.len() * 3);
        for t in &bad {
            for (a, b) in [(t.v[0], t.v[1]), (t.v[1], t.v[2]), (t.v[2], t.v[0])] {
                if let Some(pos) = edges
                    .iter()
                    .position(|&(x, y)| (x == b && y == a) || (x == a && y == b))
                {
                    edges.swap_remove(pos);
                } else {
                    edges.push((a, b));
                }
            }
        }
        for (a, b) in edges {
            if let Some(t) = Triangle::new([a, b, i], &xy) {
                triangles.push(t);
            }
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .map(|t| t.v)
        .collect()
}
