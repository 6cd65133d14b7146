//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::VolForgeError;

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VolForgeError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is non-negative and finite (rejects NaN, Inf, negatives).
pub(crate) fn validate_non_negative(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(VolForgeError::InvalidInput {
            message: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(VolForgeError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that every element of a slice is finite.
pub(crate) fn validate_all_finite(values: &[f64], name: &str) -> crate::error::Result<()> {
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(VolForgeError::InvalidInput {
            message: format!("{name}[{i}] must be finite, got {v}"),
        });
    }
    Ok(())
}

/// Config-side check: a value must lie in `[lo, hi]`.
pub(crate) fn config_in_range(value: f64, lo: f64, hi: f64, name: &str) -> crate::error::Result<()> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(VolForgeError::InvalidConfig {
            message: format!("{name} must be in [{lo}, {hi}], got {value}"),
        });
    }
    Ok(())
}
