//! Core value types shared across the engine.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes**: [`Vol`] and [`Variance`] wrap scalar estimates
//! so callers can't accidentally mix an annualized volatility with a
//! per-period variance.
//!
//! **Inputs use bare `f64`**: methods like `call_price(spot, strike, ...)`
//! accept raw floats; parameter names document the meaning.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Annualized volatility `σ`, measured as a standard deviation.
///
/// A vol of 0.20 represents 20% annualized volatility.
///
/// # Examples
/// ```
/// use volforge::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Variance `σ²`, per period unless documented otherwise.
///
/// # Examples
/// ```
/// use volforge::types::Variance;
/// let var = Variance(0.04); // corresponds to 20% vol
/// assert!((var.to_vol().0 - 0.20).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

impl Variance {
    /// Square root of the variance (negative variances clamp to zero).
    pub fn to_vol(self) -> Vol {
        Vol(self.0.max(0.0).sqrt())
    }
}

impl Vol {
    /// Square of the volatility.
    pub fn to_variance(self) -> Variance {
        Variance(self.0 * self.0)
    }
}

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}
