//! Error types for wave construction

use thiserror::Error;

/// Errors raised when building sources or validating parameters
#[derive(Debug, Error)]
pub enum WaveError {
    /// Wavelength must be finite and strictly positive.
    #[error("invalid wavelength: {wavelength} (must be finite and > 0)")]
    InvalidWavelength {
        /// The rejected wavelength
        wavelength: f64,
    },

    /// A physical constant is out of range.
    #[error("invalid physical parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The rejected value
        value: f64,
    },
}

/// A specialized `Result` type for wave operations.
pub type Result<T> = std::result::Result<T, WaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WaveError::InvalidWavelength { wavelength: -1.0 };
        assert_eq!(err.to_string(), "invalid wavelength: -1 (must be finite and > 0)");
    }
}
