//! Historical replay of the realized/implied spread rule.
//!
//! Every observation with `abs(spread_pct) > threshold` opens a one-period
//! vol trade with the simplified P&L `−spread_pct · 100`.

use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::conventions::TRADING_DAYS_PER_YEAR;
use crate::error::Result;

/// One simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    /// Index of the triggering observation.
    pub index: usize,
    pub spread_pct: f64,
    pub pnl: f64,
}

/// Performance of the spread rule over a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolArbitrageMetrics {
    pub total_pnl: f64,
    pub n_trades: usize,
    /// Observations skipped for a zero or non-finite vol.
    pub n_skipped: usize,
    /// Share of trades with positive P&L.
    pub win_rate: f64,
    /// Mean P&L of winning trades, 0 without wins.
    pub avg_win: f64,
    /// Mean P&L of losing trades (negative), 0 without losses.
    pub avg_loss: f64,
    /// `mean / std · √252` over per-trade P&L, 0 when the std is 0.
    pub sharpe_ratio: f64,
    /// Largest fall of cumulative P&L from its running peak (≤ 0).
    pub max_drawdown: f64,
    pub trades: Vec<BacktestTrade>,
}

/// Replays `(realized_vol, implied_vol)` pairs through the spread rule.
///
/// ```
/// use volforge::signal::VolArbitrageBacktest;
///
/// let history = [(0.40, 0.50), (0.50, 0.52), (0.60, 0.45)];
/// let metrics = VolArbitrageBacktest::default().run(&history)?;
/// assert_eq!(metrics.n_trades, 2);
/// assert!((metrics.total_pnl - 0.0).abs() < 1e-9);
/// # Ok::<(), volforge::VolForgeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolArbitrageBacktest {
    config: SignalConfig,
}

impl VolArbitrageBacktest {
    pub fn new(threshold: f64) -> Self {
        Self::with_config(SignalConfig {
            threshold,
            ..SignalConfig::default()
        })
    }

    pub fn with_config(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Run over `(realized_vol, implied_vol)` observations.
    ///
    /// Observations where either vol is zero or non-finite are skipped. A
    /// replay with no trades reports zero metrics.
    ///
    /// # Errors
    /// [`VolForgeError::InvalidConfig`](crate::VolForgeError::InvalidConfig)
    /// for an invalid configuration.
    pub fn run(&self, observations: &[(f64, f64)]) -> Result<VolArbitrageMetrics> {
        self.config.validate()?;

        let mut trades = Vec::new();
        let mut n_skipped = 0;
        for (index, &(rv, iv)) in observations.iter().enumerate() {
            if !(rv.is_finite() && iv.is_finite()) || rv == 0.0 || iv == 0.0 {
                n_skipped += 1;
                continue;
            }
            let spread_pct = (iv - rv) / rv;
            if spread_pct.abs() > self.config.threshold {
                trades.push(BacktestTrade {
                    index,
                    spread_pct,
                    pnl: -spread_pct * 100.0,
                });
            }
        }

        let pnl: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
        let n = pnl.len();
        let total_pnl: f64 = pnl.iter().sum();
        let wins: Vec<f64> = pnl.iter().copied().filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = pnl.iter().copied().filter(|&p| p < 0.0).collect();
        let mean_of = |v: &[f64]| {
            if v.is_empty() {
                0.0
            } else {
                v.iter().sum::<f64>() / v.len() as f64
            }
        };

        let sharpe_ratio = if n > 0 {
            let mean = total_pnl / n as f64;
            let std = (pnl.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n as f64).sqrt();
            if std > 0.0 {
                mean / std * TRADING_DAYS_PER_YEAR.sqrt()
            } else {
                0.0
            }
        } else {
            0.0
        };

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_observations = observations.len(),
            n_trades = n,
            n_skipped,
            total_pnl,
            "vol arbitrage backtest complete"
        );

        Ok(VolArbitrageMetrics {
            total_pnl,
            n_trades: n,
            n_skipped,
            win_rate: if n > 0 { wins.len() as f64 / n as f64 } else { 0.0 },
            avg_win: mean_of(&wins),
            avg_loss: mean_of(&losses),
            sharpe_ratio,
            max_drawdown: max_drawdown(&pnl),
            trades,
        })
    }
}

/// Minimum of cumulative P&L minus its running maximum.
fn max_drawdown(pnl: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for p in pnl {
        cumulative += p;
        peak = peak.max(cumulative);
        worst = worst.min(cumulative - peak);
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VolForgeError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn trades_only_beyond_threshold() {
        let m = VolArbitrageBacktest::default()
            .run(&[(0.40, 0.50), (0.50, 0.52), (0.50, 0.40), (0.0, 0.3), (f64::NAN, 0.2)])
            .unwrap();
        assert_eq!(m.n_trades, 2);
        assert_eq!(m.n_skipped, 2);
        assert_eq!(m.trades[0].index, 0);
        assert_abs_diff_eq!(m.trades[0].pnl, -25.0, epsilon = 1e-9);
        assert_eq!(m.trades[1].index, 2);
        assert_abs_diff_eq!(m.trades[1].pnl, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.total_pnl, -5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.win_rate, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m.avg_win, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.avg_loss, -25.0, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_annualizes_per_trade_ratio() {
        // P&L: +20, -25 → mean -2.5, population std 22.5
        let m = VolArbitrageBacktest::default()
            .run(&[(0.50, 0.40), (0.40, 0.50)])
            .unwrap();
        assert_abs_diff_eq!(m.sharpe_ratio, -2.5 / 22.5 * 252f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn drawdown_from_running_peak() {
        assert_abs_diff_eq!(max_drawdown(&[10.0, -4.0, 3.0, -12.0, 5.0]), -13.0, epsilon = 1e-12);
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        // First trade is the peak even when it is a loss
        assert_eq!(max_drawdown(&[-5.0, -3.0]), -3.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn no_trades_reports_zeros() {
        let m = VolArbitrageBacktest::new(0.5).run(&[(0.4, 0.45), (0.4, 0.41)]).unwrap();
        assert_eq!(m.n_trades, 0);
        assert_eq!(m.total_pnl, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn constant_pnl_has_zero_sharpe() {
        let m = VolArbitrageBacktest::default()
            .run(&[(0.40, 0.50), (0.40, 0.50)])
            .unwrap();
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_abs_diff_eq!(m.max_drawdown, -25.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_threshold_is_a_config_error() {
        assert!(matches!(
            VolArbitrageBacktest::new(f64::NAN).run(&[]),
            Err(VolForgeError::InvalidConfig { .. })
        ));
    }
}
