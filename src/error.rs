//! Error types for the volforge library.
//!
//! Caller-facing failures are limited to bad inputs, short data and
//! numerically unavailable results. Optimizer non-convergence is not an
//! error here: GARCH fits and the implied-vol solver recover locally and
//! report a status on their result instead.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolForgeError>;

/// Errors that can occur in the volatility engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VolForgeError {
    /// The series or window is shorter than the operation requires.
    ///
    /// Distinct from a valid zero estimate so callers can detect stale or
    /// truncated data deterministically.
    #[error("insufficient data for {context}: need {required}, have {available}")]
    InsufficientData {
        /// Operation that could not run (e.g., "parkinson").
        context: &'static str,
        /// Number of observations required.
        required: usize,
        /// Number of observations supplied.
        available: usize,
    },

    /// Input data is invalid (e.g., negative price, NaN strike, high below low).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Numerical computation failed (e.g., singular RBF system, NaN result).
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// A configuration value is out of range.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}
