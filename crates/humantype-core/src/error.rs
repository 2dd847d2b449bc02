//! Configuration validation error shared by every model.

use thiserror::Error;

/// A configuration value was rejected at construction time.
///
/// Configuration is validated exactly once, when a model or engine is built.
/// Nothing is re-validated per character.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range.
    #[error("invalid configuration for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field as it appears in preset files.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fails with [`ConfigError::Invalid`] unless `value` is finite and `>= 0`.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a finite value >= 0, got {value}"),
        ))
    }
}

/// Fails with [`ConfigError::Invalid`] unless `value` lies in `0.0..=1.0`.
pub(crate) fn ensure_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be between 0 and 1, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_rejects_nan_and_negatives() {
        assert!(ensure_non_negative("x", 0.0).is_ok());
        assert!(ensure_non_negative("x", 12.5).is_ok());
        assert!(ensure_non_negative("x", -0.1).is_err());
        assert!(ensure_non_negative("x", f64::NAN).is_err());
        assert!(ensure_non_negative("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_probability_bounds_are_inclusive() {
        assert!(ensure_probability("p", 0.0).is_ok());
        assert!(ensure_probability("p", 1.0).is_ok());
        assert!(ensure_probability("p", 1.01).is_err());
        assert!(ensure_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_error_message_names_the_field() {
        let err = ConfigError::invalid("base_delay_ms", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration for `base_delay_ms`: must be positive"
        );
    }
}
