//! Error types for conversion operations
//!
//! The crate-level conversion functions are total and never surface these
//! errors; they exist for the fallible building blocks (empty parser input,
//! selector registration, export) so callers embedding those pieces can
//! react.

use thiserror::Error;

/// Errors that can occur while converting or exporting notes
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A registry key could not be parsed as a selector
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
    /// Writing an export archive failed
    #[error("Export error: {0}")]
    Export(String),
}

impl ConversionError {
    /// Get a stable numeric error code for diagnostics
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::InvalidInput(_) => 5,
            ConversionError::InvalidSelector(_) => 6,
            ConversionError::Export(_) => 7,
        }
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::Export(err.to_string())
    }
}

impl From<zip::result::ZipError> for ConversionError {
    fn from(err: zip::result::ZipError) -> Self {
        ConversionError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            ConversionError::InvalidInput(String::new()).code(),
            ConversionError::InvalidSelector(String::new()).code(),
            ConversionError::Export(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_display_messages() {
        let err = ConversionError::InvalidSelector("li[".to_string());
        assert_eq!(err.to_string(), "Invalid selector: li[");

        let io = std::io::Error::other("disk full");
        let err: ConversionError = io.into();
        assert!(matches!(err, ConversionError::Export(ref msg) if msg.contains("disk full")));
    }
}
