//! Engine configuration.
//!
//! Plain serde structs with per-field defaults. Nothing here reads the
//! environment or the filesystem: callers deserialize or construct a config
//! and pass it explicitly to the component that needs it.
//!
//! ```
//! use volforge::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{ "signal": { "threshold": 0.15 } }"#)?;
//! assert_eq!(config.signal.threshold, 0.15);
//! assert_eq!(config.estimator.window, 30);
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::conventions::TRADING_DAYS_PER_YEAR;
use crate::error::{Result, VolForgeError};
use crate::surface::InterpolationMethod;
use crate::validate::config_in_range;

/// Aggregate configuration for every engine component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Historical volatility estimators.
    #[serde(default)]
    pub estimator: EstimatorConfig,
    /// GARCH maximum-likelihood fitting.
    #[serde(default)]
    pub garch: GarchConfig,
    /// Newton-Raphson implied volatility solver.
    #[serde(default)]
    pub iv_solver: IvSolverConfig,
    /// Volatility surface construction and queries.
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Arbitrage signal scoring.
    #[serde(default)]
    pub signal: SignalConfig,
}

impl EngineConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        self.garch.validate()?;
        self.iv_solver.validate()?;
        self.surface.validate()?;
        self.signal.validate()
    }
}

/// Historical volatility estimator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Trailing window size in candles.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Annualization factor (periods per year).
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            periods_per_year: default_periods_per_year(),
        }
    }
}

impl EstimatorConfig {
    /// Validate window and annualization factor.
    pub fn validate(&self) -> Result<()> {
        if self.window < 2 {
            return Err(VolForgeError::InvalidConfig {
                message: format!("estimator window must be >= 2, got {}", self.window),
            });
        }
        config_in_range(self.periods_per_year, 1.0, 1e7, "periods_per_year")
    }
}

/// GARCH fitting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchConfig {
    /// Nelder-Mead iteration cap.
    #[serde(default = "default_garch_max_iterations")]
    pub max_iterations: usize,
    /// Convergence threshold on the negative log-likelihood spread.
    #[serde(default = "default_garch_tolerance")]
    pub tolerance: f64,
    /// Minimum number of returns required before attempting a fit.
    #[serde(default = "default_garch_min_observations")]
    pub min_observations: usize,
    /// Annualization factor for forecasts.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    /// Subtract the sample mean from returns before fitting (constant-mean model).
    #[serde(default = "default_true")]
    pub demean: bool,
}

impl Default for GarchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_garch_max_iterations(),
            tolerance: default_garch_tolerance(),
            min_observations: default_garch_min_observations(),
            periods_per_year: default_periods_per_year(),
            demean: true,
        }
    }
}

impl GarchConfig {
    /// Validate optimizer limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(VolForgeError::InvalidConfig {
                message: "garch max_iterations must be > 0".into(),
            });
        }
        if self.min_observations < 10 {
            return Err(VolForgeError::InvalidConfig {
                message: format!(
                    "garch min_observations must be >= 10, got {}",
                    self.min_observations
                ),
            });
        }
        config_in_range(self.tolerance, f64::MIN_POSITIVE, 1.0, "garch tolerance")?;
        config_in_range(self.periods_per_year, 1.0, 1e7, "periods_per_year")
    }
}

/// Newton-Raphson implied volatility solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvSolverConfig {
    /// Starting volatility.
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,
    /// Price tolerance `|target − price(σ)|`.
    #[serde(default = "default_iv_tolerance")]
    pub tolerance: f64,
    /// Iteration cap.
    #[serde(default = "default_iv_max_iterations")]
    pub max_iterations: usize,
    /// Lower clamp applied to every iterate.
    #[serde(default = "default_min_vol")]
    pub min_vol: f64,
    /// Upper clamp applied to every iterate.
    #[serde(default = "default_max_vol")]
    pub max_vol: f64,
    /// Vega below which the solver stops and returns its current estimate.
    #[serde(default = "default_vega_floor")]
    pub vega_floor: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: default_initial_guess(),
            tolerance: default_iv_tolerance(),
            max_iterations: default_iv_max_iterations(),
            min_vol: default_min_vol(),
            max_vol: default_max_vol(),
            vega_floor: default_vega_floor(),
        }
    }
}

impl IvSolverConfig {
    /// Validate solver limits and clamp range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(VolForgeError::InvalidConfig {
                message: "iv max_iterations must be > 0".into(),
            });
        }
        if !(self.min_vol > 0.0 && self.min_vol < self.max_vol) {
            return Err(VolForgeError::InvalidConfig {
                message: format!(
                    "iv clamp range must satisfy 0 < min_vol < max_vol, got [{}, {}]",
                    self.min_vol, self.max_vol
                ),
            });
        }
        config_in_range(self.initial_guess, self.min_vol, self.max_vol, "initial_guess")?;
        config_in_range(self.tolerance, f64::MIN_POSITIVE, 1.0, "iv tolerance")?;
        config_in_range(self.vega_floor, 0.0, 1.0, "vega_floor")
    }
}

/// Volatility surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Interpolation method for `build_surface`.
    #[serde(default)]
    pub method: InterpolationMethod,
    /// Grid points per axis.
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: usize,
    /// Maturities closer than this are grouped into one ATM term-structure node.
    #[serde(default = "default_atm_tolerance")]
    pub atm_maturity_tolerance: f64,
    /// Maturity matching tolerance when selecting a smile slice for skew.
    #[serde(default = "default_skew_tolerance")]
    pub skew_maturity_tolerance: f64,
    /// OTM put strike as a fraction of spot.
    #[serde(default = "default_put_pct")]
    pub put_pct: f64,
    /// OTM call strike as a fraction of spot.
    #[serde(default = "default_call_pct")]
    pub call_pct: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::default(),
            grid_resolution: default_grid_resolution(),
            atm_maturity_tolerance: default_atm_tolerance(),
            skew_maturity_tolerance: default_skew_tolerance(),
            put_pct: default_put_pct(),
            call_pct: default_call_pct(),
        }
    }
}

impl SurfaceConfig {
    /// Validate grid and tolerances.
    pub fn validate(&self) -> Result<()> {
        if self.grid_resolution < 2 {
            return Err(VolForgeError::InvalidConfig {
                message: format!(
                    "grid_resolution must be >= 2, got {}",
                    self.grid_resolution
                ),
            });
        }
        config_in_range(self.atm_maturity_tolerance, 0.0, 1.0, "atm_maturity_tolerance")?;
        config_in_range(self.skew_maturity_tolerance, 0.0, 1.0, "skew_maturity_tolerance")?;
        config_in_range(self.put_pct, 0.01, 1.0, "put_pct")?;
        config_in_range(self.call_pct, 1.0, 100.0, "call_pct")
    }
}

/// Arbitrage signal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Minimum |spread_pct| before an opportunity is emitted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Realized-vol band earning the full regime score.
    #[serde(default = "default_normal_regime")]
    pub normal_regime: (f64, f64),
    /// Wider realized-vol band earning a partial regime score.
    #[serde(default = "default_extended_regime")]
    pub extended_regime: (f64, f64),
    /// Minimum |implied − realized| before the GARCH forecast is scored.
    #[serde(default = "default_min_garch_gap")]
    pub min_garch_gap: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            normal_regime: default_normal_regime(),
            extended_regime: default_extended_regime(),
            min_garch_gap: default_min_garch_gap(),
        }
    }
}

impl SignalConfig {
    /// Validate threshold and regime bands.
    pub fn validate(&self) -> Result<()> {
        config_in_range(self.threshold, 0.0, 10.0, "threshold")?;
        config_in_range(self.min_garch_gap, 0.0, 10.0, "min_garch_gap")?;
        let (lo, hi) = self.normal_regime;
        let (elo, ehi) = self.extended_regime;
        if !(lo < hi && elo <= lo && hi <= ehi) {
            return Err(VolForgeError::InvalidConfig {
                message: format!(
                    "regime bands must nest: extended ({elo}, {ehi}) must contain normal ({lo}, {hi})"
                ),
            });
        }
        Ok(())
    }
}

const fn default_window() -> usize {
    30
}

const fn default_periods_per_year() -> f64 {
    TRADING_DAYS_PER_YEAR
}

const fn default_true() -> bool {
    true
}

const fn default_garch_max_iterations() -> usize {
    2000
}

const fn default_garch_tolerance() -> f64 {
    1e-9
}

const fn default_garch_min_observations() -> usize {
    30
}

const fn default_initial_guess() -> f64 {
    0.30
}

const fn default_iv_tolerance() -> f64 {
    1e-6
}

const fn default_iv_max_iterations() -> usize {
    100
}

const fn default_min_vol() -> f64 {
    0.001
}

const fn default_max_vol() -> f64 {
    5.0
}

const fn default_vega_floor() -> f64 {
    1e-10
}

const fn default_grid_resolution() -> usize {
    50
}

const fn default_atm_tolerance() -> f64 {
    1e-3
}

const fn default_skew_tolerance() -> f64 {
    1e-2
}

const fn default_put_pct() -> f64 {
    0.9
}

const fn default_call_pct() -> f64 {
    1.1
}

const fn default_threshold() -> f64 {
    0.10
}

const fn default_normal_regime() -> (f64, f64) {
    (0.3, 0.8)
}

const fn default_extended_regime() -> (f64, f64) {
    (0.2, 1.0)
}

const fn default_min_garch_gap() -> f64 {
    0.05
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.iv_solver.max_iterations, 100);
        assert_eq!(config.surface.method, InterpolationMethod::Cubic);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "surface": { "method": "rbf", "grid_resolution": 20 } }"#)
                .unwrap();
        assert_eq!(config.surface.method, InterpolationMethod::Rbf);
        assert_eq!(config.surface.grid_resolution, 20);
        assert_eq!(config.surface.put_pct, 0.9);
    }

    #[test]
    fn rejects_tiny_window() {
        let config = EstimatorConfig {
            window: 1,
            ..EstimatorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VolForgeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_inverted_iv_clamp() {
        let config = IvSolverConfig {
            min_vol: 2.0,
            max_vol: 1.0,
            ..IvSolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_nested_regimes() {
        let config = SignalConfig {
            normal_regime: (0.1, 0.8),
            ..SignalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_single_point_grid() {
        let config = SurfaceConfig {
            grid_resolution: 1,
            ..SurfaceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
