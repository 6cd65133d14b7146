//! Volatility arbitrage signals from realized, implied and forecast vol.
//!
//! When implied volatility diverges from realized volatility by more than a
//! threshold, [`ArbitrageSignalGenerator`] emits an [`ArbitrageOpportunity`]
//! carrying a strategy, a 0–100 confidence score and a sizing
//! recommendation.
//!
//! # Confidence
//!
//! Three additive sub-scores:
//!
//! | component | points | rule |
//! |-----------|--------|------|
//! | spread    | 0–40   | `40 · min(abs(spread_pct) / 0.5, 1)` |
//! | GARCH     | 0/15/30 | 30 if the forecast sits on the implied side of realized, 15 otherwise; 0 when `abs(iv − rv) <= min_garch_gap` |
//! | regime    | 10/20/30 | 30 inside the normal realized-vol band, 20 inside the extended band, 10 otherwise |
//!
//! ```
//! use chrono::Utc;
//! use volforge::signal::{ArbitrageSignalGenerator, Strategy, VolObservation};
//!
//! let generator = ArbitrageSignalGenerator::default();
//! let obs = VolObservation::new("ETH/USD", Utc::now(), 3200.0, 0.45, 0.58, 0.50);
//! let opp = generator.evaluate(&obs)?.expect("spread above threshold");
//!
//! assert_eq!(opp.strategy, Strategy::SellVolatility);
//! assert!((opp.spread_pct - 0.2889).abs() < 1e-4);
//! assert!(opp.confidence > 40.0);
//! # Ok::<(), volforge::VolForgeError>(())
//! ```

pub mod backtest;

pub use backtest::{BacktestTrade, VolArbitrageBacktest, VolArbitrageMetrics};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::error::Result;
use crate::validate::{validate_non_negative, validate_positive};

/// Spread magnitude earning the full spread score.
const FULL_SPREAD_PCT: f64 = 0.5;
const SPREAD_POINTS: f64 = 40.0;
const GARCH_POINTS: f64 = 30.0;
const REGIME_POINTS: f64 = 30.0;

/// Confidence below which the recommendation is to monitor only.
pub const MONITOR_BELOW: f64 = 40.0;
/// Confidence at or above which the recommendation is full size.
pub const FULL_SIZE_FROM: f64 = 70.0;

/// Volatility trade implied by the spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Implied above realized: short straddles/strangles.
    SellVolatility,
    /// Implied below realized: long straddles/strangles.
    BuyVolatility,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::SellVolatility => "sell_volatility",
            Self::BuyVolatility => "buy_volatility",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::SellVolatility => Direction::Short,
            Self::BuyVolatility => Direction::Long,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position in volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

/// Sizing recommendation derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "strategy", rename_all = "snake_case")]
pub enum RecommendedAction {
    Monitor,
    SmallSize(Strategy),
    FullSize(Strategy),
}

impl RecommendedAction {
    pub fn from_confidence(strategy: Strategy, confidence: f64) -> Self {
        if confidence < MONITOR_BELOW {
            Self::Monitor
        } else if confidence < FULL_SIZE_FROM {
            Self::SmallSize(strategy)
        } else {
            Self::FullSize(strategy)
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monitor => f.write_str("monitor"),
            Self::SmallSize(s) => write!(f, "{s}_small_size"),
            Self::FullSize(s) => write!(f, "{s}_full_size"),
        }
    }
}

/// One instrument's volatility snapshot, as fed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolObservation {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub spot: f64,
    pub realized_vol: f64,
    pub implied_vol: f64,
    pub garch_forecast: f64,
}

impl VolObservation {
    pub fn new(
        pair: impl Into<String>,
        timestamp: DateTime<Utc>,
        spot: f64,
        realized_vol: f64,
        implied_vol: f64,
        garch_forecast: f64,
    ) -> Self {
        Self {
            pair: pair.into(),
            timestamp,
            spot,
            realized_vol,
            implied_vol,
            garch_forecast,
        }
    }
}

/// Immutable record of a detected vol-arbitrage opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub spot: f64,
    pub realized_vol: f64,
    pub implied_vol: f64,
    pub garch_forecast: f64,
    /// `implied_vol − realized_vol`.
    pub spread: f64,
    /// `spread / realized_vol`.
    pub spread_pct: f64,
    pub strategy: Strategy,
    pub direction: Direction,
    /// In `[0, 100]`.
    pub confidence: f64,
    pub reasoning: String,
    pub recommended_action: RecommendedAction,
}

/// Scores realized/implied divergences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbitrageSignalGenerator {
    config: SignalConfig,
}

impl ArbitrageSignalGenerator {
    pub fn new(threshold: f64) -> Self {
        Self::with_config(SignalConfig {
            threshold,
            ..SignalConfig::default()
        })
    }

    pub fn with_config(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Evaluate one snapshot.
    ///
    /// Returns `Ok(None)` when `|spread_pct|` does not exceed the threshold.
    ///
    /// # Errors
    /// [`VolForgeError::InvalidInput`](crate::VolForgeError::InvalidInput)
    /// if realized vol or spot is not positive, or implied vol or the GARCH
    /// forecast is negative or non-finite;
    /// [`VolForgeError::InvalidConfig`](crate::VolForgeError::InvalidConfig)
    /// for an invalid configuration.
    pub fn evaluate(&self, obs: &VolObservation) -> Result<Option<ArbitrageOpportunity>> {
        self.config.validate()?;
        let rv = validate_positive(obs.realized_vol, "realized_vol")?;
        let iv = validate_non_negative(obs.implied_vol, "implied_vol")?;
        let garch = validate_non_negative(obs.garch_forecast, "garch_forecast")?;
        validate_positive(obs.spot, "spot")?;

        let spread = iv - rv;
        let spread_pct = spread / rv;
        if spread_pct.abs() <= self.config.threshold {
            return Ok(None);
        }

        let strategy = if iv > rv {
            Strategy::SellVolatility
        } else {
            Strategy::BuyVolatility
        };
        let confidence = self.confidence(spread_pct, rv, iv, garch);
        let recommended_action = RecommendedAction::from_confidence(strategy, confidence);
        let relation = if iv > rv { "higher" } else { "lower" };
        let reasoning = format!(
            "IV ({:.2}%) is {:.1}% {relation} than RV ({:.2}%); GARCH forecast {:.2}%",
            iv * 100.0,
            spread_pct.abs() * 100.0,
            rv * 100.0,
            garch * 100.0,
        );

        #[cfg(feature = "logging")]
        tracing::debug!(
            pair = %obs.pair,
            spread_pct,
            confidence,
            %strategy,
            "arbitrage opportunity detected"
        );

        Ok(Some(ArbitrageOpportunity {
            pair: obs.pair.clone(),
            timestamp: obs.timestamp,
            spot: obs.spot,
            realized_vol: rv,
            implied_vol: iv,
            garch_forecast: garch,
            spread,
            spread_pct,
            strategy,
            direction: strategy.direction(),
            confidence,
            reasoning,
            recommended_action,
        }))
    }

    /// Evaluate a batch, keeping only emitted opportunities.
    pub fn evaluate_all(&self, observations: &[VolObservation]) -> Result<Vec<ArbitrageOpportunity>> {
        observations
            .iter()
            .filter_map(|obs| self.evaluate(obs).transpose())
            .collect()
    }

    /// Confidence score in `[0, 100]`.
    pub fn confidence(&self, spread_pct: f64, rv: f64, iv: f64, garch: f64) -> f64 {
        let spread_score = (spread_pct.abs() / FULL_SPREAD_PCT).min(1.0) * SPREAD_POINTS;
        let score = spread_score + self.garch_score(rv, iv, garch) + self.regime_score(rv);
        score.clamp(0.0, 100.0)
    }

    /// Agreement of the GARCH forecast with the implied-vs-realized gap.
    ///
    /// Full credit when the forecast moves away from realized vol in the
    /// same direction as implied vol, half credit otherwise.
    fn garch_score(&self, rv: f64, iv: f64, garch: f64) -> f64 {
        if (iv - rv).abs() <= self.config.min_garch_gap {
            return 0.0;
        }
        let agrees = if iv > rv { garch > rv } else { garch < rv };
        if agrees {
            GARCH_POINTS
        } else {
            GARCH_POINTS / 2.0
        }
    }

    fn regime_score(&self, rv: f64) -> f64 {
        let inside = |(lo, hi): (f64, f64)| rv > lo && rv < hi;
        if inside(self.config.normal_regime) {
            REGIME_POINTS
        } else if inside(self.config.extended_regime) {
            REGIME_POINTS * 2.0 / 3.0
        } else {
            REGIME_POINTS / 3.0
        }
    }
}

/// Opportunities with `confidence >= min_confidence`.
pub fn filter_by_confidence(
    opportunities: &[ArbitrageOpportunity],
    min_confidence: f64,
) -> Vec<&ArbitrageOpportunity> {
    opportunities
        .iter()
        .filter(|o| o.confidence >= min_confidence)
        .collect()
}

/// Highest-confidence opportunity; the first one on ties.
pub fn best_opportunity(opportunities: &[ArbitrageOpportunity]) -> Option<&ArbitrageOpportunity> {
    opportunities
        .iter()
        .reduce(|best, o| if o.confidence > best.confidence { o } else { best })
}
