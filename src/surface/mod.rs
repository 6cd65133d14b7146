//! Implied volatility surface construction from scattered quotes.
//!
//! [`VolatilitySurfaceBuilder`] accumulates `(strike, maturity, implied_vol)`
//! observations and derives from them:
//!
//! - an interpolated strike × maturity [`SurfaceGrid`] (linear, cubic or
//!   thin-plate RBF, see [`InterpolationMethod`])
//! - point queries via [`get_vol`](VolatilitySurfaceBuilder::get_vol)
//! - the ATM [`TermStructure`], skew and smile curvature
//!
//! Interpolation works in coordinates normalized to the observed strike and
//! maturity ranges, since strikes and year fractions differ by orders of
//! magnitude.

mod builder;
pub mod delaunay;
pub mod grid;
pub(crate) mod interp;
pub mod rbf;
pub mod spline;

pub use builder::{MIN_BUILD_POINTS, MIN_QUERY_POINTS, VolatilitySurfaceBuilder};
pub use delaunay::Triangulation;
pub use grid::{InterpolationMethod, SurfaceGrid, SurfaceSummary, TermPoint, TermStructure};
pub use rbf::ThinPlateRbf;
pub use spline::SliceSpline;

/// A scattered-data interpolant over `(strike, maturity)`.
///
/// Implementations are immutable once fitted and `Send + Sync` so grid rows
/// can be evaluated in parallel.
pub trait SurfaceInterpolator: Send + Sync + std::fmt::Debug {
    /// Interpolated implied vol, `None` where the interpolant is undefined.
    fn interpolate(&self, strike: f64, maturity: f64) -> Option<f64>;
}
