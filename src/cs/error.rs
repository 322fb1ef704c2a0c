//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced by the coders and their collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value or argument is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The compressed stream ended before the expected number of bytes was decoded.
    #[error("compressed stream truncated: expected {expected} bytes, decoded {decoded}")]
    Truncated {
        /// Number of bytes the caller said the stream holds.
        expected: u64,
        /// Number of bytes actually decoded.
        decoded: u64,
    },

    /// The sink rejected a write.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::Truncated {
            expected: 10,
            decoded: 4,
        };
        assert_eq!(
            err.to_string(),
            "compressed stream truncated: expected 10 bytes, decoded 4"
        );
        assert_eq!(
            Error::invalid_input("zero threshold").to_string(),
            "invalid input: zero threshold"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
