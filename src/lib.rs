//! # volforge
//!
//! Volatility analytics engine: realized-vol estimation, GARCH forecasting,
//! Black-Scholes pricing, implied-vol surfaces and vol-arbitrage signals.
//!
//! The components are independent and composed by the caller into a
//! pipeline: candles → realized vol → GARCH forecast → (with option quotes)
//! implied-vol surface → arbitrage signal.
//!
//! ## Architecture
//!
//! - **`series`**: OHLCV candles and bounded, time-ordered series
//! - **`historical`**: Close-to-close, Parkinson, Garman-Klass,
//!   Rogers-Satchell and Yang-Zhang estimators
//! - **`garch`**: GARCH(1,1), EGARCH and GJR-GARCH maximum-likelihood fits,
//!   forecasts and rolling backtests
//! - **`pricing`**: Black-Scholes prices, Greeks and option quotes
//! - **`implied`**: Newton-Raphson implied volatility
//! - **`surface`**: Scattered-quote surface builder (linear, cubic, RBF)
//! - **`signal`**: Realized/implied divergence scoring and its backtest
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for inputs.** [`Vol`] and
//!   [`Variance`] wrap estimator results; inputs take raw `f64` and are
//!   validated inside each operation.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Local recovery is visible.** A GARCH fit that falls back to default
//!   parameters carries [`FitStatus::Failed`](garch::FitStatus::Failed); an
//!   implied-vol solve that stops early carries a
//!   [`SolverStatus`](implied::SolverStatus). Both also emit `tracing`
//!   warnings under the default `logging` feature.
//! - **Explicit configuration.** Every component takes its settings from a
//!   [`config`] struct passed to `with_config`; nothing is read from the
//!   environment.
//! - **Serializable.** Inputs, configs and result records implement Serde
//!   `Serialize` / `Deserialize`.
//!
//! ## Example
//!
//! ```
//! use volforge::pricing::black_scholes;
//! use volforge::implied::implied_volatility;
//! use volforge::OptionType;
//!
//! let price = black_scholes::call_price(100.0, 100.0, 0.25, 0.05, 0.2);
//! assert!((price - 4.615).abs() < 1e-3);
//!
//! let iv = implied_volatility(price, 100.0, 100.0, 0.25, 0.05, OptionType::Call)?;
//! assert!(iv.is_converged());
//! assert!((iv.vol - 0.2).abs() < 1e-6);
//! # Ok::<(), volforge::VolForgeError>(())
//! ```

pub mod config;
pub mod conventions;
pub mod error;
pub mod garch;
pub mod historical;
pub mod implied;
mod optim;
pub mod pricing;
pub mod series;
pub mod signal;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use error::{Result, VolForgeError};
#[doc(inline)]
pub use series::{Candle, Series};
#[doc(inline)]
pub use types::{OptionType, Variance, Vol};
