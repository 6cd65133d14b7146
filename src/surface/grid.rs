//! Surface output records: the interpolated grid, ATM term structure and
//! point-set summary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interpolation scheme used to fill the strike × maturity grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Barycentric interpolation on a Delaunay triangulation.
    Linear,
    /// Natural cubic spline in strike per maturity slice.
    #[default]
    Cubic,
    /// Thin-plate spline radial basis function.
    Rbf,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 3] = [Self::Linear, Self::Cubic, Self::Rbf];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Rbf => "rbf",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implied vols on a rectangular strike × maturity grid.
///
/// `vols[i][j]` is the vol at `maturities[i]`, `strikes[j]`; `None` where the
/// method is undefined (outside the convex hull for linear and cubic).
/// An empty grid means too few points were available to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub method: InterpolationMethod,
    pub strikes: Vec<f64>,
    pub maturities: Vec<f64>,
    pub vols: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    pub fn empty(method: InterpolationMethod) -> Self {
        Self {
            method,
            strikes: Vec::new(),
            maturities: Vec::new(),
            vols: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vols.is_empty()
    }

    /// `(maturities, strikes)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.maturities.len(), self.strikes.len())
    }

    /// Grid value at `(maturity index, strike index)`.
    pub fn get(&self, maturity_idx: usize, strike_idx: usize) -> Option<f64> {
        self.vols.get(maturity_idx)?.get(strike_idx).copied().flatten()
    }

    /// Number of grid nodes with a defined vol.
    pub fn defined_count(&self) -> usize {
        self.vols.iter().flatten().filter(|v| v.is_some()).count()
    }
}

/// One node of the ATM term structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermPoint {
    pub maturity: f64,
    /// Observed strike closest to spot for this maturity.
    pub strike: f64,
    pub implied_vol: f64,
}

/// ATM implied vol per observed maturity, sorted by maturity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
    pub points: Vec<TermPoint>,
}

impl TermStructure {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn maturities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.maturity).collect()
    }

    pub fn vols(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.implied_vol).collect()
    }

    /// ATM vol at the node within `tolerance` of `maturity`.
    pub fn vol_at(&self, maturity: f64, tolerance: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| (p.maturity - maturity).abs() <= tolerance)
            .map(|p| p.implied_vol)
    }
}

/// Descriptive statistics of the raw point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSummary {
    pub n_points: usize,
    pub strike_range: (f64, f64),
    pub maturity_range: (f64, f64),
    pub vol_range: (f64, f64),
    pub mean_vol: f64,
    /// Population standard deviation.
    pub std_vol: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_serde_names() {
        for m in InterpolationMethod::ALL {
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{m}\""));
            let back: InterpolationMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(back, m);
        }
    }

    #[test]
    fn grid_accessors() {
        let grid = SurfaceGrid {
            method: InterpolationMethod::Linear,
            strikes: vec![90.0, 110.0],
            maturities: vec![0.5],
            vols: vec![vec![Some(0.2), None]],
        };
        assert_eq!(grid.shape(), (1, 2));
        assert_eq!(grid.get(0, 0), Some(0.2));
        assert_eq!(grid.get(0, 1), None);
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.defined_count(), 1);
        assert!(SurfaceGrid::empty(InterpolationMethod::Rbf).is_empty());
    }

    #[test]
    fn term_structure_lookup() {
        let ts = TermStructure {
            points: vec![
                TermPoint { maturity: 0.25, strike: 100.0, implied_vol: 0.3 },
                TermPoint { maturity: 1.0, strike: 100.0, implied_vol: 0.25 },
            ],
        };
        assert_eq!(ts.vol_at(1.0005, 1e-3), Some(0.25));
        assert_eq!(ts.vol_at(0.5, 1e-3), None);
        assert_eq!(ts.maturities(), vec![0.25, 1.0]);
    }
}
