use std::sync::OnceLock;

use crate::config::SurfaceConfig;
use crate::error::{Result, VolForgeError};
use crate::pricing::OptionQuote;
use crate::surface::delaunay::Triangulation;
use crate::surface::grid::{
    InterpolationMethod, SurfaceGrid, SurfaceSummary, TermPoint, TermStructure,
};
use crate::surface::interp::{Point, linear_extrapolate, linspace};
use crate::surface::rbf::ThinPlateRbf;
use crate::surface::spline::SliceSpline;
use crate::surface::SurfaceInterpolator;
use crate::validate::validate_positive;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fewest points `build_surface` will interpolate.
pub const MIN_BUILD_POINTS: usize = 4;
/// Fewest points `get_vol` will answer for.
pub const MIN_QUERY_POINTS: usize = 3;

/// Accumulates `(strike, maturity, implied_vol)` observations and derives an
/// interpolated surface from them.
///
/// Raw points are append-only until [`clear`](Self::clear). Every write
/// invalidates the cached grid and the query triangulation; the grid is
/// rebuilt by [`build_surface`](Self::build_surface) or lazily by
/// [`surface`](Self::surface).
///
/// # Examples
///
/// ```
/// use volforge::surface::{InterpolationMethod, VolatilitySurfaceBuilder};
///
/// let mut builder = VolatilitySurfaceBuilder::new();
/// for &t in &[0.25, 0.5, 1.0] {
///     for &k in &[90.0, 100.0, 110.0] {
///         let m: f64 = k / 100.0 - 1.0;
///         builder.add_point(k, t, 0.2 + 0.5 * m * m)?;
///     }
/// }
///
/// let grid = builder.build_surface(InterpolationMethod::Linear, 5)?;
/// assert_eq!(grid.shape(), (5, 5));
///
/// let vol = builder.get_vol(100.0, 0.5).unwrap();
/// assert!((vol - 0.2).abs() < 1e-12);
///
/// builder.set_spot(100.0)?;
/// let skew = builder.calculate_skew(0.5).unwrap();
/// assert!(skew.abs() < 1e-12);
/// # Ok::<(), volforge::VolForgeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolatilitySurfaceBuilder {
    strikes: Vec<f64>,
    maturities: Vec<f64>,
    implied_vols: Vec<f64>,
    spot: Option<f64>,
    config: SurfaceConfig,
    /// Method and resolution of the last build, reused by `surface()`.
    last_build: Option<(InterpolationMethod, usize)>,
    grid: Option<SurfaceGrid>,
    query: OnceLock<Triangulation>,
}

impl VolatilitySurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SurfaceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Append one observation. Repeated `(strike, maturity)` pairs are kept
    /// as additional samples.
    ///
    /// # Errors
    /// [`VolForgeError::InvalidInput`] unless all three values are positive
    /// and finite.
    pub fn add_point(&mut self, strike: f64, maturity: f64, implied_vol: f64) -> Result<()> {
        validate_point(strike, maturity, implied_vol)?;
        self.strikes.push(strike);
        self.maturities.push(maturity);
        self.implied_vols.push(implied_vol);
        self.invalidate();
        Ok(())
    }

    /// Append several observations; nothing is added if any is invalid.
    pub fn add_points(&mut self, points: &[(f64, f64, f64)]) -> Result<()> {
        for &(k, t, v) in points {
            validate_point(k, t, v)?;
        }
        for &(k, t, v) in points {
            self.strikes.push(k);
            self.maturities.push(t);
            self.implied_vols.push(v);
        }
        if !points.is_empty() {
            self.invalidate();
        }
        Ok(())
    }

    /// Solve the quote's implied vol and append it.
    ///
    /// # Errors
    /// Propagates quote validation errors, and returns
    /// [`VolForgeError::NumericalError`] when the solver did not converge.
    pub fn add_quote(&mut self, quote: &OptionQuote) -> Result<()> {
        let (k, t, v) = quote.surface_point()?;
        self.add_point(k, t, v)
    }

    /// Remove every observation and the cached surface. Spot is kept.
    pub fn clear(&mut self) {
        self.strikes.clear();
        self.maturities.clear();
        self.implied_vols.clear();
        self.invalidate();
    }

    pub fn set_spot(&mut self, spot: f64) -> Result<()> {
        self.spot = Some(validate_positive(spot, "spot")?);
        Ok(())
    }

    pub fn spot(&self) -> Option<f64> {
        self.spot
    }

    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    /// Observations in insertion order.
    pub fn points(&self) -> Vec<(f64, f64, f64)> {
        self.strikes
            .iter()
            .zip(&self.maturities)
            .zip(&self.implied_vols)
            .map(|((&k, &t), &v)| (k, t, v))
            .collect()
    }

    fn invalidate(&mut self) {
        self.grid = None;
        self.query = OnceLock::new();
    }

    /// Interpolate the observations onto a `grid_resolution × grid_resolution`
    /// grid spanning the observed strike and maturity ranges.
    ///
    /// With fewer than four points the result is an empty grid, which is a
    /// valid answer distinct from an error.
    ///
    /// # Errors
    /// - [`VolForgeError::InvalidInput`] if `grid_resolution < 2`.
    /// - [`VolForgeError::NumericalError`] if the RBF system is singular or
    ///   interpolation produced a non-finite value.
    pub fn build_surface(
        &mut self,
        method: InterpolationMethod,
        grid_resolution: usize,
    ) -> Result<&SurfaceGrid> {
        if grid_resolution < 2 {
            return Err(VolForgeError::InvalidInput {
                message: format!("grid_resolution must be >= 2, got {grid_resolution}"),
            });
        }
        self.last_build = Some((method, grid_resolution));

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_points = self.len(),
            %method,
            grid_resolution,
            "surface build started"
        );

        if self.len() < MIN_BUILD_POINTS {
            #[cfg(feature = "logging")]
            tracing::warn!(
                n_points = self.len(),
                required = MIN_BUILD_POINTS,
                "too few points to build surface"
            );
            return Ok(&*self.grid.insert(SurfaceGrid::empty(method)));
        }

        let points = self.points();
        let interpolator: Box<dyn SurfaceInterpolator> = match method {
            InterpolationMethod::Linear => Box::new(Triangulation::new(&points)),
            InterpolationMethod::Cubic => Box::new(SliceSpline::new(&points)),
            InterpolationMethod::Rbf => Box::new(ThinPlateRbf::new(&points)?),
        };

        let (k_lo, k_hi) = min_max(&self.strikes);
        let (t_lo, t_hi) = min_max(&self.maturities);
        let strikes = linspace(k_lo, k_hi, grid_resolution);
        let maturities = linspace(t_lo, t_hi, grid_resolution);

        let row = |&t: &f64| -> Vec<Option<f64>> {
            strikes.iter().map(|&k| interpolator.interpolate(k, t)).collect()
        };
        #[cfg(feature = "parallel")]
        let vols: Vec<Vec<Option<f64>>> = maturities.par_iter().map(row).collect();
        #[cfg(not(feature = "parallel"))]
        let vols: Vec<Vec<Option<f64>>> = maturities.iter().map(row).collect();

        if vols.iter().flatten().flatten().any(|v| !v.is_finite()) {
            return Err(VolForgeError::NumericalError {
                message: format!("{method} interpolation produced a non-finite vol"),
            });
        }

        let grid = SurfaceGrid {
            method,
            strikes,
            maturities,
            vols,
        };

        #[cfg(feature = "logging")]
        tracing::debug!(
            defined = grid.defined_count(),
            total = grid_resolution * grid_resolution,
            "surface build complete"
        );

        Ok(&*self.grid.insert(grid))
    }

    /// The cached grid, rebuilding it after an invalidating write.
    ///
    /// Rebuilds with the last method and resolution passed to
    /// [`build_surface`](Self::build_surface), or the configured defaults.
    pub fn surface(&mut self) -> Result<&SurfaceGrid> {
        if self.grid.is_none() {
            let (method, resolution) = self
                .last_build
                .unwrap_or((self.config.method, self.config.grid_resolution));
            self.build_surface(method, resolution)?;
        }
        self.grid.as_ref().ok_or_else(|| VolForgeError::NumericalError {
            message: "surface unavailable".into(),
        })
    }

    /// The cached grid without rebuilding; `None` after any write.
    pub fn cached_surface(&self) -> Option<&SurfaceGrid> {
        self.grid.as_ref()
    }

    /// Implied vol at an arbitrary point of the raw observations.
    ///
    /// Linear interpolation on the triangulated points, falling back to the
    /// nearest observation outside their convex hull. `None` with fewer than
    /// three points or for non-finite queries.
    pub fn get_vol(&self, strike: f64, maturity: f64) -> Option<f64> {
        if self.len() < MIN_QUERY_POINTS || !(strike.is_finite() && maturity.is_finite()) {
            return None;
        }
        let tri = self.query.get_or_init(|| Triangulation::new(&self.points()));
        tri.interpolate(strike, maturity)
            .or_else(|| tri.nearest(strike, maturity))
    }

    /// ATM vol per observed maturity: the vol at the observed strike closest
    /// to `spot`. Also records `spot` for skew and curvature queries.
    ///
    /// Maturities within `atm_maturity_tolerance` of the first maturity of a
    /// group share one node.
    pub fn get_atm_term_structure(&mut self, spot: f64) -> Result<TermStructure> {
        self.set_spot(spot)?;
        let tol = self.config.atm_maturity_tolerance;

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.maturities[a].total_cmp(&self.maturities[b]).then(a.cmp(&b)));

        let mut points = Vec::new();
        let mut start = 0;
        while start < order.len() {
            let t0 = self.maturities[order[start]];
            let end = start
                + order[start..]
                    .iter()
                    .take_while(|&&i| self.maturities[i] - t0 < tol)
                    .count();
            let mut group = order[start..end].to_vec();
            group.sort_unstable();
            if let Some(&atm) = group.iter().min_by(|&&a, &&b| {
                (self.strikes[a] - spot)
                    .abs()
                    .total_cmp(&(self.strikes[b] - spot).abs())
            }) {
                points.push(TermPoint {
                    maturity: t0,
                    strike: self.strikes[atm],
                    implied_vol: self.implied_vols[atm],
                });
            }
            start = end;
        }
        Ok(TermStructure { points })
    }

    /// Skew `IV(put_pct·spot) − IV(call_pct·spot)` using the configured
    /// strike fractions.
    pub fn calculate_skew(&self, maturity: f64) -> Option<f64> {
        self.calculate_skew_with(maturity, self.config.put_pct, self.config.call_pct)
    }

    /// Skew from the smile slice within `skew_maturity_tolerance` of
    /// `maturity`, linearly interpolated (and extrapolated) in strike.
    ///
    /// `None` when spot is unset or the slice has fewer than two distinct
    /// strikes.
    pub fn calculate_skew_with(&self, maturity: f64, put_pct: f64, call_pct: f64) -> Option<f64> {
        let Some(spot) = self.spot else {
            #[cfg(feature = "logging")]
            tracing::warn!("spot must be set before calculating skew");
            return None;
        };
        let tol = self.config.skew_maturity_tolerance;
        let mut slice: Vec<(f64, f64)> = self
            .points()
            .into_iter()
            .filter(|p| (p.1 - maturity).abs() < tol)
            .map(|(k, _, v)| (k, v))
            .collect();
        slice.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Average repeated strikes so the abscissae are strictly increasing.
        let mut xs: Vec<f64> = Vec::with_capacity(slice.len());
        let mut ys: Vec<f64> = Vec::with_capacity(slice.len());
        let mut count = 0usize;
        for (k, v) in slice {
            if xs.last() == Some(&k) {
                count += 1;
                if let Some(last) = ys.last_mut() {
                    *last += (v - *last) / count as f64;
                }
            } else {
                xs.push(k);
                ys.push(v);
                count = 1;
            }
        }
        if xs.len() < 2 {
            return None;
        }

        let iv_put = linear_extrapolate(&xs, &ys, spot * put_pct);
        let iv_call = linear_extrapolate(&xs, &ys, spot * call_pct);
        Some(iv_put - iv_call)
    }

    /// Smile convexity `(IV(put) + IV(call) − 2·IV(ATM)) / IV(ATM)` at the
    /// configured strike fractions of spot, using [`get_vol`](Self::get_vol).
    pub fn calculate_smile_curvature(&self, maturity: f64) -> Option<f64> {
        let spot = self.spot?;
        let atm = self.get_vol(spot, maturity)?;
        let put = self.get_vol(spot * self.config.put_pct, maturity)?;
        let call = self.get_vol(spot * self.config.call_pct, maturity)?;
        (atm > 0.0).then(|| (put + call - 2.0 * atm) / atm)
    }

    /// Ranges, mean and population std of the raw observations.
    pub fn summary(&self) -> Option<SurfaceSummary> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let mean = self.implied_vols.iter().sum::<f64>() / n;
        let var = self
            .implied_vols
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(SurfaceSummary {
            n_points: self.len(),
            strike_range: min_max(&self.strikes),
            maturity_range: min_max(&self.maturities),
            vol_range: min_max(&self.implied_vols),
            mean_vol: mean,
            std_vol: var.sqrt(),
        })
    }
}

fn validate_point(strike: f64, maturity: f64, implied_vol: f64) -> Result<Point> {
    Ok((
        validate_positive(strike, "strike")?,
        validate_positive(maturity, "maturity")?,
        validate_positive(implied_vol, "implied_vol")?,
    ))
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{QuoteValue, black_scholes};
    use crate::types::OptionType;
    use approx::assert_abs_diff_eq;

    /// Symmetric smile around a spot of 100.
    fn smile_vol(k: f64) -> f64 {
        let m = k / 100.0;
        0.40 + 8.0 * (m - 1.0).powi(2)
    }

    fn smile_builder() -> VolatilitySurfaceBuilder {
        let mut b = VolatilitySurfaceBuilder::new();
        for &t in &[0.25, 0.5, 1.0] {
            for &k in &[80.0, 90.0, 100.0, 110.0, 120.0] {
                b.add_point(k, t, smile_vol(k)).unwrap();
            }
        }
        b
    }

    #[test]
    fn add_point_validates_and_keeps_duplicates() {
        let mut b = VolatilitySurfaceBuilder::new();
        b.add_point(100.0, 0.5, 0.2).unwrap();
        b.add_point(100.0, 0.5, 0.3).unwrap();
        assert_eq!(b.len(), 2);
        for (k, t, v) in [(0.0, 0.5, 0.2), (100.0, -1.0, 0.2), (100.0, 0.5, f64::NAN)] {
            assert!(matches!(
                b.add_point(k, t, v),
                Err(VolForgeError::InvalidInput { .. })
            ));
        }
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn add_points_is_all_or_nothing() {
        let mut b = VolatilitySurfaceBuilder::new();
        let err = b.add_points(&[(90.0, 0.5, 0.2), (100.0, 0.5, -0.1)]);
        assert!(err.is_err());
        assert!(b.is_empty());
        b.add_points(&[(90.0, 0.5, 0.2), (100.0, 0.5, 0.25)]).unwrap();
        assert_eq!(b.points(), vec![(90.0, 0.5, 0.2), (100.0, 0.5, 0.25)]);
    }

    #[test]
    fn too_few_points_build_empty_grid() {
        let mut b = VolatilitySurfaceBuilder::new();
        b.add_points(&[(90.0, 0.5, 0.2), (100.0, 0.5, 0.25), (110.0, 1.0, 0.3)])
            .unwrap();
        let grid = b.build_surface(InterpolationMethod::Cubic, 10).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.method, InterpolationMethod::Cubic);
    }

    #[test]
    fn rejects_degenerate_resolution() {
        let mut b = smile_builder();
        assert!(matches!(
            b.build_surface(InterpolationMethod::Linear, 1),
            Err(VolForgeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn grid_spans_observed_ranges() {
        let mut b = smile_builder();
        for method in InterpolationMethod::ALL {
            let grid = b.build_surface(method, 9).unwrap().clone();
            assert_eq!(grid.shape(), (9, 9));
            assert_eq!(grid.strikes[0], 80.0);
            assert_eq!(grid.strikes[8], 120.0);
            assert_eq!(grid.maturities[0], 0.25);
            assert_eq!(grid.maturities[8], 1.0);
            // Rectangular sample grid: the hull is the whole box
            assert_eq!(grid.defined_count(), 81, "{method}");
            // Corner nodes coincide with observations
            assert_abs_diff_eq!(grid.get(0, 0).unwrap(), smile_vol(80.0), epsilon = 1e-9);
            assert_abs_diff_eq!(grid.get(8, 4).unwrap(), smile_vol(100.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_grid_is_undefined_outside_hull() {
        let mut b = VolatilitySurfaceBuilder::new();
        b.add_points(&[
            (80.0, 0.25, 0.3),
            (120.0, 0.25, 0.3),
            (100.0, 1.0, 0.2),
            (100.0, 0.5, 0.25),
        ])
        .unwrap();
        let grid = b.build_surface(InterpolationMethod::Linear, 5).unwrap();
        // Top corners of the bounding box lie outside the triangle
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.get(4, 4), None);
        assert!(grid.get(4, 2).is_some());

        let rbf = b.build_surface(InterpolationMethod::Rbf, 5).unwrap();
        assert_eq!(rbf.defined_count(), 25);
    }

    #[test]
    fn writes_invalidate_cached_grid() {
        let mut b = smile_builder();
        b.build_surface(InterpolationMethod::Linear, 4).unwrap();
        assert!(b.cached_surface().is_some());
        b.add_point(130.0, 0.5, 0.5).unwrap();
        assert!(b.cached_surface().is_none());

        let rebuilt = b.surface().unwrap();
        assert_eq!(rebuilt.method, InterpolationMethod::Linear);
        assert_eq!(rebuilt.strikes.len(), 4);
        assert_eq!(rebuilt.strikes[3], 130.0);

        b.clear();
        assert!(b.is_empty());
        assert!(b.cached_surface().is_none());
        assert!(b.get_vol(100.0, 0.5).is_none());
    }

    #[test]
    fn surface_uses_config_defaults_before_first_build() {
        let mut b = smile_builder();
        let grid = b.surface().unwrap();
        assert_eq!(grid.method, InterpolationMethod::Cubic);
        assert_eq!(grid.shape(), (50, 50));
    }

    #[test]
    fn get_vol_interpolates_and_falls_back() {
        let b = smile_builder();
        assert_abs_diff_eq!(b.get_vol(90.0, 0.5).unwrap(), smile_vol(90.0), epsilon = 1e-12);
        assert_abs_diff_eq!(
            b.get_vol(95.0, 0.4).unwrap(),
            0.5 * (smile_vol(90.0) + smile_vol(100.0)),
            epsilon = 1e-12
        );
        // Outside the hull: nearest observation
        assert_abs_diff_eq!(b.get_vol(200.0, 0.5).unwrap(), smile_vol(120.0), epsilon = 1e-12);
        assert_abs_diff_eq!(b.get_vol(100.0, 5.0).unwrap(), smile_vol(100.0), epsilon = 1e-12);
        assert!(b.get_vol(f64::NAN, 0.5).is_none());
    }

    #[test]
    fn get_vol_needs_three_points() {
        let mut b = VolatilitySurfaceBuilder::new();
        b.add_points(&[(90.0, 0.5, 0.2), (100.0, 0.5, 0.25)]).unwrap();
        assert!(b.get_vol(95.0, 0.5).is_none());
        b.add_point(110.0, 0.5, 0.3).unwrap();
        // Collinear: nearest neighbour only
        assert_eq!(b.get_vol(96.0, 0.5), Some(0.25));
    }

    #[test]
    fn atm_term_structure_picks_closest_strike() {
        let mut b = smile_builder();
        b.add_point(101.0, 2.0, 0.33).unwrap();
        b.add_point(98.0, 2.0005, 0.35).unwrap();
        let ts = b.get_atm_term_structure(99.0).unwrap();
        assert_eq!(b.spot(), Some(99.0));
        assert_eq!(ts.maturities(), vec![0.25, 0.5, 1.0, 2.0]);
        assert_eq!(ts.points[0].strike, 100.0);
        assert_eq!(ts.points[3].strike, 98.0);
        assert_eq!(ts.points[3].implied_vol, 0.35);
    }

    #[test]
    fn skew_requires_spot() {
        let b = smile_builder();
        assert!(b.calculate_skew(0.5).is_none());
        assert!(b.calculate_smile_curvature(0.5).is_none());
    }

    #[test]
    fn symmetric_smile_has_zero_skew() {
        let mut b = smile_builder();
        b.set_spot(100.0).unwrap();
        let skew = b.calculate_skew(0.5).unwrap();
        assert_abs_diff_eq!(skew, smile_vol(90.0) - smile_vol(110.0), epsilon = 1e-12);
        assert_abs_diff_eq!(skew, 0.0, epsilon = 1e-12);
        // Off-grid strikes are interpolated linearly
        let wide = b.calculate_skew_with(0.5, 0.85, 1.15).unwrap();
        assert_abs_diff_eq!(wide, 0.0, epsilon = 1e-12);
        // No slice at this maturity
        assert!(b.calculate_skew(0.75).is_none());
    }

    #[test]
    fn skew_extrapolates_beyond_slice() {
        let mut b = VolatilitySurfaceBuilder::new();
        b.add_points(&[(95.0, 0.5, 0.30), (100.0, 0.5, 0.25), (100.0, 0.5, 0.25)])
            .unwrap();
        b.set_spot(100.0).unwrap();
        // Line through (95, 0.30), (100, 0.25): IV(90) = 0.35, IV(110) = 0.15
        assert_abs_diff_eq!(b.calculate_skew(0.5).unwrap(), 0.20, epsilon = 1e-12);
    }

    #[test]
    fn curvature_of_convex_smile_is_positive() {
        let mut b = smile_builder();
        b.set_spot(100.0).unwrap();
        let c = b.calculate_smile_curvature(0.5).unwrap();
        let expected = (smile_vol(90.0) + smile_vol(110.0) - 2.0 * smile_vol(100.0)) / smile_vol(100.0);
        assert_abs_diff_eq!(c, expected, epsilon = 1e-12);
        assert!(c > 0.0);
    }

    #[test]
    fn summary_statistics() {
        let mut b = VolatilitySurfaceBuilder::new();
        assert!(b.summary().is_none());
        b.add_points(&[(90.0, 0.25, 0.2), (110.0, 1.0, 0.4)]).unwrap();
        let s = b.summary().unwrap();
        assert_eq!(s.n_points, 2);
        assert_eq!(s.strike_range, (90.0, 110.0));
        assert_eq!(s.maturity_range, (0.25, 1.0));
        assert_abs_diff_eq!(s.mean_vol, 0.3, epsilon = 1e-15);
        assert_abs_diff_eq!(s.std_vol, 0.1, epsilon = 1e-15);
    }

    #[test]
    fn quotes_feed_the_surface() {
        let mut b = VolatilitySurfaceBuilder::new();
        let price = black_scholes::call_price(100.0, 105.0, 0.5, 0.02, 0.27);
        let quote = OptionQuote::new(
            105.0,
            0.5,
            OptionType::Call,
            100.0,
            0.02,
            QuoteValue::Price(price),
        )
        .unwrap();
        b.add_quote(&quote).unwrap();
        let (k, t, v) = b.points()[0];
        assert_eq!((k, t), (105.0, 0.5));
        assert_abs_diff_eq!(v, 0.27, epsilon = 1e-5);
    }
}
