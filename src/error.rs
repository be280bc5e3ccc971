//! Error types for the MLCC library.

use thiserror::Error;

/// Errors produced by the MLCC cipher core and key model.
///
/// The analysis toolkit never returns these for well-formed ciphertext; it
/// reports weak results through low scores instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MlccError {
    /// Key-generation or alphabet parameters are out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A serialized or hand-built key is unusable (non-bijective
    /// substitution, empty keyword, unknown direction token, ...).
    #[error("Malformed key: {0}")]
    MalformedKey(String),
    /// The transposition grid cannot be built for this width and length.
    #[error("Invalid grid dimensions: width {width} for a message of {len} symbols")]
    InvalidGridDimensions { width: usize, len: usize },
    /// Decoding changed the length or alphabet-symbol count of the text.
    #[error("Decryption failed: {0}")]
    DecryptionError(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MlccError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_parameter() {
        let err = MlccError::InvalidParameter("block width must be at least 1".into());
        assert_eq!(
            format!("{}", err),
            "Invalid parameter: block width must be at least 1"
        );
    }

    #[test]
    fn test_display_malformed_key() {
        let err = MlccError::MalformedKey("empty keyword".into());
        assert_eq!(format!("{}", err), "Malformed key: empty keyword");
    }

    #[test]
    fn test_display_invalid_grid_dimensions() {
        let err = MlccError::InvalidGridDimensions { width: 0, len: 12 };
        assert_eq!(
            format!("{}", err),
            "Invalid grid dimensions: width 0 for a message of 12 symbols"
        );
    }

    #[test]
    fn test_display_decryption_error() {
        let err = MlccError::DecryptionError("length changed".into());
        assert_eq!(format!("{}", err), "Decryption failed: length changed");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            MlccError::MalformedKey("x".into()),
            MlccError::MalformedKey("x".into())
        );
        assert_ne!(
            MlccError::MalformedKey("x".into()),
            MlccError::InvalidParameter("x".into())
        );
    }
}
