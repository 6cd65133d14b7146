//! OHLCV candles and bounded, time-ordered candle series.
//!
//! A [`Series`] is the input to every historical estimator and, via
//! [`Series::log_returns`], to the GARCH fitter. Returns are never cached:
//! they are recomputed from the close prices on each call.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{self, VolForgeError};
use crate::validate::{validate_non_negative, validate_positive};

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Construct a validated candle.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InvalidInput`] if any price is non-positive or
    /// non-finite, volume is negative, or the high/low do not bracket the
    /// open and close.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> error::Result<Self> {
        let candle = Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate()?;
        Ok(candle)
    }

    /// Check price positivity and OHLC consistency.
    pub fn validate(&self) -> error::Result<()> {
        validate_positive(self.open, "open")?;
        validate_positive(self.high, "high")?;
        validate_positive(self.low, "low")?;
        validate_positive(self.close, "close")?;
        validate_non_negative(self.volume, "volume")?;
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(VolForgeError::InvalidInput {
                message: format!(
                    "candle at {} has inconsistent range: o={} h={} l={} c={}",
                    self.timestamp, self.open, self.high, self.low, self.close
                ),
            });
        }
        Ok(())
    }
}

/// Bounded, time-ordered sequence of candles.
///
/// Pushing past `capacity` evicts the oldest candle.
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use volforge::series::{Candle, Series};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut series = Series::new(2);
/// for (i, close) in [100.0, 101.0, 99.5].into_iter().enumerate() {
///     let c = Candle::new(t0 + Duration::days(i as i64), close, close, close, close, 0.0)?;
///     series.push(c)?;
/// }
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.log_returns().len(), 1);
/// # Ok::<(), volforge::VolForgeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    capacity: usize,
    candles: VecDeque<Candle>,
}

impl Series {
    /// Empty series holding at most `capacity` candles (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            candles: VecDeque::with_capacity(capacity),
        }
    }

    /// Build a series from existing candles, keeping the newest `capacity`.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InvalidInput`] if a candle is invalid or
    /// timestamps are not strictly increasing.
    pub fn from_candles(candles: &[Candle], capacity: usize) -> error::Result<Self> {
        let mut series = Self::new(capacity);
        for candle in candles {
            series.push(*candle)?;
        }
        Ok(series)
    }

    /// Build an unbounded-in-practice series sized to `candles`.
    pub fn from_vec(candles: Vec<Candle>) -> error::Result<Self> {
        let capacity = candles.len();
        Self::from_candles(&candles, capacity)
    }

    /// Append a candle, evicting the oldest one at capacity.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InvalidInput`] if the candle is invalid or
    /// not strictly newer than the last one.
    pub fn push(&mut self, candle: Candle) -> error::Result<()> {
        candle.validate()?;
        if let Some(last) = self.candles.back()
            && candle.timestamp <= last.timestamp
        {
            return Err(VolForgeError::InvalidInput {
                message: format!(
                    "candle at {} is not newer than last candle at {}",
                    candle.timestamp, last.timestamp
                ),
            });
        }
        if self.candles.len() == self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Candles oldest first.
    pub fn candles(&self) -> impl ExactSizeIterator<Item = &Candle> {
        self.candles.iter()
    }

    /// The newest `n` candles (or all, if fewer), oldest first.
    pub fn tail(&self, n: usize) -> Vec<Candle> {
        let skip = self.candles.len().saturating_sub(n);
        self.candles.iter().skip(skip).copied().collect()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.back().map(|c| c.close)
    }

    /// Log close-to-close returns, length `len() − 1`.
    pub fn log_returns(&self) -> Vec<f64> {
        log_returns(&self.closes())
    }
}

/// Log returns `ln(p_t / p_{t−1})` of a price sequence.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}
