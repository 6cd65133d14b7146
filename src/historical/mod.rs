//! Historical (realized) volatility estimators over a trailing candle window.
//!
//! Five estimators are provided, from the classic close-to-close standard
//! deviation to the drift-independent, overnight-aware Yang-Zhang blend.
//! Every estimator is a pure function of the newest `window` candles of a
//! [`Series`]; if the series is shorter than the window the call fails with
//! [`VolForgeError::InsufficientData`] instead of quietly using fewer
//! candles.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use volforge::historical::{Estimator, HistoricalVolatilityEstimator};
//! use volforge::series::{Candle, Series};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let candles: Vec<Candle> = (0..40)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.7).sin();
//!         Candle::new(t0 + Duration::days(i), c, c * 1.01, c * 0.99, c, 1e3)
//!     })
//!     .collect::<Result<_, _>>()?;
//! let series = Series::from_vec(candles)?;
//!
//! let estimator = HistoricalVolatilityEstimator::new(30);
//! let vol = estimator.estimate(Estimator::YangZhang, &series)?;
//! assert!(vol.0 > 0.0);
//! # Ok::<(), volforge::VolForgeError>(())
//! ```

pub mod estimators;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::error::{Result, VolForgeError};
use crate::series::{Candle, Series};
use crate::types::Vol;

/// Historical volatility estimator formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    CloseToClose,
    Parkinson,
    GarmanKlass,
    RogersSatchell,
    /// Most efficient of the five; the default.
    #[default]
    YangZhang,
}

impl Estimator {
    /// All estimators, in increasing order of statistical efficiency.
    pub const ALL: [Estimator; 5] = [
        Estimator::CloseToClose,
        Estimator::Parkinson,
        Estimator::GarmanKlass,
        Estimator::RogersSatchell,
        Estimator::YangZhang,
    ];

    /// Stable snake_case name, also used as the error context.
    pub fn name(self) -> &'static str {
        match self {
            Estimator::CloseToClose => "close_to_close",
            Estimator::Parkinson => "parkinson",
            Estimator::GarmanKlass => "garman_klass",
            Estimator::RogersSatchell => "rogers_satchell",
            Estimator::YangZhang => "yang_zhang",
        }
    }

    /// Candles needed for a window of `window` periods.
    ///
    /// Close-to-close uses `window` returns and so needs one extra candle.
    /// Yang-Zhang needs at least three candles for its sample variances.
    pub fn required_candles(self, window: usize) -> usize {
        match self {
            Estimator::CloseToClose => window + 1,
            Estimator::YangZhang => window.max(3),
            _ => window.max(1),
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse volatility regime of an annualized realized vol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolRegime {
    /// Below 20%.
    Low,
    /// 20% to 50%.
    Normal,
    /// 50% to 80%.
    Elevated,
    /// 80% and above.
    High,
}

impl VolRegime {
    pub fn classify(vol: f64) -> Self {
        if vol < 0.20 {
            VolRegime::Low
        } else if vol < 0.50 {
            VolRegime::Normal
        } else if vol < 0.80 {
            VolRegime::Elevated
        } else {
            VolRegime::High
        }
    }
}

/// Every estimator evaluated on one series.
///
/// Individual estimates are `None` when the series is too short for that
/// estimator's window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub window: usize,
    pub close_to_close: Option<f64>,
    pub parkinson: Option<f64>,
    pub garman_klass: Option<f64>,
    pub rogers_satchell: Option<f64>,
    pub yang_zhang: Option<f64>,
    /// Close-to-close realized vol, the reference for spread calculations.
    pub realized_vol: Option<f64>,
    pub last_close: Option<f64>,
    pub regime: Option<VolRegime>,
}

/// Realized volatility over a trailing window of a candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalVolatilityEstimator {
    config: EstimatorConfig,
}

impl Default for HistoricalVolatilityEstimator {
    fn default() -> Self {
        Self::with_config(EstimatorConfig::default())
    }
}

impl HistoricalVolatilityEstimator {
    /// Estimator with the given window and daily (252) annualization.
    pub fn new(window: usize) -> Self {
        Self::with_config(EstimatorConfig {
            window,
            ..EstimatorConfig::default()
        })
    }

    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn window(&self) -> usize {
        self.config.window
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Run `estimator` over the newest candles of `series`.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InsufficientData`] if the series is shorter
    /// than the estimator needs, or [`VolForgeError::InvalidConfig`] for a
    /// window below 2.
    pub fn estimate(&self, estimator: Estimator, series: &Series) -> Result<Vol> {
        self.config.validate()?;
        let required = estimator.required_candles(self.config.window);
        if series.len() < required {
            return Err(VolForgeError::InsufficientData {
                context: estimator.name(),
                required,
                available: series.len(),
            });
        }
        let window = series.tail(required);
        let vol = self.apply(estimator, &window);

        #[cfg(feature = "logging")]
        tracing::debug!(
            estimator = estimator.name(),
            window = self.config.window,
            vol,
            "historical volatility estimated"
        );

        Ok(Vol(vol))
    }

    fn apply(&self, estimator: Estimator, candles: &[Candle]) -> f64 {
        let periods = self.config.periods_per_year;
        match estimator {
            Estimator::CloseToClose => estimators::close_to_close(candles, periods),
            Estimator::Parkinson => estimators::parkinson(candles, periods),
            Estimator::GarmanKlass => estimators::garman_klass(candles, periods),
            Estimator::RogersSatchell => estimators::rogers_satchell(candles, periods),
            Estimator::YangZhang => estimators::yang_zhang(candles, periods),
        }
    }

    /// Annualized close-to-close standard deviation over `window` returns.
    pub fn close_to_close(&self, series: &Series) -> Result<Vol> {
        self.estimate(Estimator::CloseToClose, series)
    }

    /// Parkinson high-low range estimator.
    pub fn parkinson(&self, series: &Series) -> Result<Vol> {
        self.estimate(Estimator::Parkinson, series)
    }

    /// Garman-Klass OHLC estimator.
    pub fn garman_klass(&self, series: &Series) -> Result<Vol> {
        self.estimate(Estimator::GarmanKlass, series)
    }

    /// Rogers-Satchell drift-independent estimator.
    pub fn rogers_satchell(&self, series: &Series) -> Result<Vol> {
        self.estimate(Estimator::RogersSatchell, series)
    }

    /// Yang-Zhang overnight-aware estimator.
    pub fn yang_zhang(&self, series: &Series) -> Result<Vol> {
        self.estimate(Estimator::YangZhang, series)
    }

    /// Evaluate every estimator and classify the realized-vol regime.
    ///
    /// Never fails on short data: estimators that cannot run are `None`.
    pub fn report(&self, series: &Series) -> Result<VolatilityReport> {
        self.config.validate()?;
        let run = |e: Estimator| match self.estimate(e, series) {
            Ok(v) => Ok(Some(v.0)),
            Err(VolForgeError::InsufficientData { .. }) => Ok(None),
            Err(err) => Err(err),
        };
        let close_to_close = run(Estimator::CloseToClose)?;
        Ok(VolatilityReport {
            window: self.config.window,
            close_to_close,
            parkinson: run(Estimator::Parkinson)?,
            garman_klass: run(Estimator::GarmanKlass)?,
            rogers_satchell: run(Estimator::RogersSatchell)?,
            yang_zhang: run(Estimator::YangZhang)?,
            realized_vol: close_to_close,
            last_close: series.last_close(),
            regime: close_to_close.map(VolRegime::classify),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(n: usize, scale: f64) -> Series {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..n)
            .map(|i| {
                let x = i as f64;
                let close = scale * (100.0 + 3.0 * (x * 0.9).sin());
                let open = scale * (100.0 + 3.0 * ((x - 0.4) * 0.9).sin());
                let high = open.max(close) * 1.012;
                let low = open.min(close) * 0.987;
                Candle::new(t0 + Duration::days(i as i64), open, high, low, close, 5e3).unwrap()
            })
            .collect();
        Series::from_vec(candles).unwrap()
    }

    #[test]
    fn short_series_is_insufficient_not_zero() {
        let est = HistoricalVolatilityEstimator::new(30);
        let s = series(30, 1.0);
        // 30 candles is enough for range estimators but not for 30 returns.
        assert!(est.parkinson(&s).is_ok());
        match est.close_to_close(&s) {
            Err(VolForgeError::InsufficientData {
                context,
                required,
                available,
            }) => {
                assert_eq!(context, "close_to_close");
                assert_eq!(required, 31);
                assert_eq!(available, 30);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
        let short = series(10, 1.0);
        for e in Estimator::ALL {
            assert!(matches!(
                est.estimate(e, &short),
                Err(VolForgeError::InsufficientData { .. })
            ));
        }
    }

    #[test]
    fn uses_only_the_trailing_window() {
        let est = HistoricalVolatilityEstimator::new(20);
        let long = series(60, 1.0);
        let tail = Series::from_vec(long.tail(21)).unwrap();
        for e in Estimator::ALL {
            assert_relative_eq!(
                est.estimate(e, &long).unwrap().0,
                est.estimate(e, &tail).unwrap().0,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn estimates_are_scale_invariant_and_positive() {
        let est = HistoricalVolatilityEstimator::default();
        let a = series(45, 1.0);
        let b = series(45, 37.5);
        for e in Estimator::ALL {
            let va = est.estimate(e, &a).unwrap().0;
            let vb = est.estimate(e, &b).unwrap().0;
            assert!(va > 0.0, "{e} should be positive");
            assert_relative_eq!(va, vb, max_relative = 1e-9);
        }
    }

    #[test]
    fn flat_prices_give_zero_vol() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..35)
            .map(|i| Candle::new(t0 + Duration::days(i), 50.0, 50.0, 50.0, 50.0, 0.0).unwrap())
            .collect();
        let s = Series::from_vec(candles).unwrap();
        let est = HistoricalVolatilityEstimator::default();
        for e in Estimator::ALL {
            assert_eq!(est.estimate(e, &s).unwrap().0, 0.0);
        }
    }

    #[test]
    fn report_marks_uncomputable_estimators() {
        let est = HistoricalVolatilityEstimator::new(30);
        let s = series(30, 1.0);
        let report = est.report(&s).unwrap();
        assert!(report.close_to_close.is_none());
        assert!(report.realized_vol.is_none());
        assert!(report.regime.is_none());
        assert!(report.parkinson.is_some());
        assert!(report.yang_zhang.is_some());
        assert_eq!(report.last_close, s.last_close());

        let full = est.report(&series(31, 1.0)).unwrap();
        let rv = full.realized_vol.unwrap();
        assert_eq!(full.regime, Some(VolRegime::classify(rv)));
    }

    #[test]
    fn invalid_window_is_config_error() {
        let est = HistoricalVolatilityEstimator::new(1);
        assert!(matches!(
            est.parkinson(&series(10, 1.0)),
            Err(VolForgeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn regime_boundaries() {
        assert_eq!(VolRegime::classify(0.19), VolRegime::Low);
        assert_eq!(VolRegime::classify(0.20), VolRegime::Normal);
        assert_eq!(VolRegime::classify(0.50), VolRegime::Elevated);
        assert_eq!(VolRegime::classify(0.80), VolRegime::High);
    }

    #[test]
    fn estimator_serde_names() {
        let json = serde_json::to_string(&Estimator::GarmanKlass).unwrap();
        assert_eq!(json, "\"garman_klass\"");
        assert_eq!(Estimator::default(), Estimator::YangZhang);
        assert_eq!(Estimator::RogersSatchell.to_string(), "rogers_satchell");
    }
}
