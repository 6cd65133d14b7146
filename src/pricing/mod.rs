//! European option pricing under Black-Scholes.
//!
//! Free functions in [`black_scholes`] are the stateless engine.
//! [`OptionQuote`] bundles one contract's inputs with either an observed
//! price or a volatility, and is what the surface builder ingests after
//! implied-vol extraction.
//!
//! ```
//! use volforge::pricing::{OptionQuote, QuoteValue};
//! use volforge::types::OptionType;
//!
//! let quote = OptionQuote::new(100.0, 0.25, OptionType::Call, 100.0, 0.05, QuoteValue::Vol(0.2))?;
//! let price = quote.price()?;
//! assert!((price - 4.615).abs() < 1e-3);
//!
//! let observed = OptionQuote { value: QuoteValue::Price(price), ..quote };
//! let iv = observed.implied_vol()?;
//! assert!((iv.vol - 0.2).abs() < 1e-6);
//! # Ok::<(), volforge::VolForgeError>(())
//! ```

pub mod black_scholes;

use serde::{Deserialize, Serialize};

use crate::config::IvSolverConfig;
use crate::error::{Result, VolForgeError};
use crate::implied::{ImpliedVolResult, SolverStatus, implied_volatility_with};
use crate::types::OptionType;
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Option price sensitivities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    /// Per 1.0 change in volatility.
    pub vega: f64,
    /// Per calendar day.
    pub theta: f64,
    /// Per 1% change in the risk-free rate.
    pub rho: f64,
}

/// What was observed for a quote: a market price or a volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteValue {
    Price(f64),
    Vol(f64),
}

/// One European option observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub strike: f64,
    /// Time to expiry in years.
    pub maturity: f64,
    pub option_type: OptionType,
    pub spot: f64,
    pub risk_free_rate: f64,
    pub value: QuoteValue,
}

impl OptionQuote {
    /// Construct a validated quote.
    ///
    /// # Errors
    /// Returns [`VolForgeError::InvalidInput`] if strike, maturity or spot
    /// are not positive, the rate is not finite, or the observed price/vol
    /// is negative or non-finite.
    pub fn new(
        strike: f64,
        maturity: f64,
        option_type: OptionType,
        spot: f64,
        risk_free_rate: f64,
        value: QuoteValue,
    ) -> Result<Self> {
        let quote = Self {
            strike,
            maturity,
            option_type,
            spot,
            risk_free_rate,
            value,
        };
        quote.validate()?;
        Ok(quote)
    }

    pub fn validate(&self) -> Result<()> {
        validate_positive(self.strike, "strike")?;
        validate_positive(self.maturity, "maturity")?;
        validate_positive(self.spot, "spot")?;
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        match self.value {
            QuoteValue::Price(p) => validate_non_negative(p, "price").map(|_| ()),
            QuoteValue::Vol(v) => validate_non_negative(v, "vol").map(|_| ()),
        }
    }

    /// Observed price, or the Black-Scholes price at the quoted vol.
    pub fn price(&self) -> Result<f64> {
        self.validate()?;
        Ok(match self.value {
            QuoteValue::Price(p) => p,
            QuoteValue::Vol(v) => black_scholes::price(
                self.option_type,
                self.spot,
                self.strike,
                self.maturity,
                self.risk_free_rate,
                v,
            ),
        })
    }

    /// Implied vol with the default solver settings.
    pub fn implied_vol(&self) -> Result<ImpliedVolResult> {
        self.implied_vol_with(&IvSolverConfig::default())
    }

    /// Implied vol of the observed price; a vol quote is returned as-is.
    pub fn implied_vol_with(&self, config: &IvSolverConfig) -> Result<ImpliedVolResult> {
        self.validate()?;
        match self.value {
            QuoteValue::Vol(v) => Ok(ImpliedVolResult {
                vol: v,
                iterations: 0,
                status: SolverStatus::Converged,
            }),
            QuoteValue::Price(p) => implied_volatility_with(
                p,
                self.spot,
                self.strike,
                self.maturity,
                self.risk_free_rate,
                self.option_type,
                config,
            ),
        }
    }

    /// Greeks at the quoted vol, or at the implied vol of a price quote.
    pub fn greeks(&self) -> Result<Greeks> {
        let vol = self.implied_vol()?.vol;
        Ok(black_scholes::greeks(
            self.option_type,
            self.spot,
            self.strike,
            self.maturity,
            self.risk_free_rate,
            vol,
        ))
    }

    /// `(strike, maturity, implied_vol)` for surface ingestion.
    ///
    /// # Errors
    /// Returns [`VolForgeError::NumericalError`] if the implied-vol solver
    /// did not converge.
    pub fn surface_point(&self) -> Result<(f64, f64, f64)> {
        let iv = self.implied_vol()?;
        if iv.status != SolverStatus::Converged {
            return Err(VolForgeError::NumericalError {
                message: format!(
                    "implied vol for strike {} maturity {} did not converge: {:?}",
                    self.strike, self.maturity, iv.status
                ),
            });
        }
        Ok((self.strike, self.maturity, iv.vol))
    }
}
