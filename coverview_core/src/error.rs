//! Error types for the CoverView simulation engine.

use thiserror::Error;

/// Errors raised while constructing simulation components.
///
/// Everything past construction is total: out-of-bounds cells are filtered and
/// degenerate geometry is skipped, so this is the only error type the core emits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A parameter that must be strictly positive was zero or negative
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// A parameter was NaN or infinite
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// A parameter was outside its accepted range
    #[error("{name} = {value} is out of range: {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Radius and grid size produce an empty grid
    #[error("search area of radius {radius}m with {grid_size}m cells has no grid cells")]
    EmptyGrid { radius: f64, grid_size: f64 },

    /// Radius and grid size produce more cells than the grid can hold
    #[error("search area of radius {radius}m with {grid_size}m cells needs {cells} cells (max {max})")]
    GridTooLarge {
        radius: f64,
        grid_size: f64,
        cells: f64,
        max: usize,
    },

    /// Camera minimum range exceeds maximum range
    #[error("camera min_range {min_range}m exceeds max_range {max_range}m")]
    InvertedRange { min_range: f64, max_range: f64 },

    /// A sample count was zero
    #[error("{0} must be at least 1")]
    ZeroSamples(&'static str),
}

impl ConfigError {
    /// Checks that `value` is finite and strictly positive.
    pub fn require_positive(name: &'static str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { name, value });
        }
        if value <= 0.0 {
            return Err(Self::NonPositive { name, value });
        }
        Ok(value)
    }

    /// Checks that `value` is finite and not negative.
    pub fn require_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { name, value });
        }
        if value < 0.0 {
            return Err(Self::OutOfRange {
                name,
                value,
                expected: ">= 0",
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(ConfigError::require_positive("radius", 2.5), Ok(2.5));
        assert!(matches!(
            ConfigError::require_positive("radius", 0.0),
            Err(ConfigError::NonPositive { name: "radius", .. })
        ));
        assert!(matches!(
            ConfigError::require_positive("radius", f64::NAN),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(ConfigError::require_non_negative("time_step", 0.0), Ok(0.0));
        assert!(ConfigError::require_non_negative("time_step", -0.1).is_err());
        assert!(ConfigError::require_non_negative("time_step", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::EmptyGrid { radius: 0.1, grid_size: 0.5 };
        assert!(err.to_string().contains("no grid cells"));

        let err = ConfigError::GridTooLarge {
            radius: 1e6,
            grid_size: 0.5,
            cells: 1.6e13,
            max: 1 << 24,
        };
        assert!(err.to_string().contains("max 16777216"));

        let err = ConfigError::ZeroSamples("angle_samples");
        assert_eq!(err.to_string(), "angle_samples must be at least 1");
    }
}
